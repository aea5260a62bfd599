use crate::adapters::storage::expand_home;
use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;
use std::path::{Component, PathBuf};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_set.contains(extension) => Ok(()),
        Some(extension) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Lexical form of a local path used for comparisons: `~` expanded, `.`
/// dropped, `..` folded into its parent. URLs are compared as written.
pub fn normalize_location(path: &str) -> String {
    if path.contains("://") {
        return path.to_string();
    }

    let mut normalized = PathBuf::new();
    for component in expand_home(path.trim()).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized.to_string_lossy().into_owned()
}

/// Every `(field, path)` pair must name a different location.
pub fn validate_distinct_paths(paths: &[(&str, &str)]) -> Result<()> {
    let mut seen: HashSet<String> = HashSet::new();
    for (field, path) in paths {
        if !seen.insert(normalize_location(path)) {
            return Err(EtlError::InvalidConfigValueError {
                field: field.to_string(),
                value: path.to_string(),
                reason: "Location is already used by another stage output".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("paths.source", "https://example.com/credit_train.csv").is_ok());
        assert!(validate_url("paths.source", "http://example.com").is_ok());
        assert!(validate_url("paths.source", "").is_err());
        assert!(validate_url("paths.source", "invalid-url").is_err());
        assert!(validate_url("paths.source", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("paths.raw", "/tmp/raw_data.csv").is_ok());
        assert!(validate_path("paths.raw", "  ").is_err());
        assert!(validate_path("paths.raw", "/tmp/\0.csv").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("paths.raw", "raw_data.csv", &["csv"]).is_ok());
        assert!(validate_file_extension("paths.raw", "raw_data.txt", &["csv"]).is_err());
        assert!(validate_file_extension("paths.raw", "raw_data", &["csv"]).is_err());
    }

    #[test]
    fn test_validate_distinct_paths() {
        assert!(validate_distinct_paths(&[("a", "/tmp/a.csv"), ("b", "/tmp/b.csv")]).is_ok());

        let err = validate_distinct_paths(&[("a", "/tmp/a.csv"), ("b", "/tmp/a.csv")]).unwrap_err();
        match err {
            EtlError::InvalidConfigValueError { field, .. } => assert_eq!(field, "b"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_distinct_paths_compare_normalized_locations() {
        assert!(validate_distinct_paths(&[("a", "./a.csv"), ("b", "a.csv")]).is_err());
        assert!(validate_distinct_paths(&[("a", "/tmp/work/../a.csv"), ("b", "/tmp/a.csv")]).is_err());
        assert!(validate_distinct_paths(&[("a", "../a.csv"), ("b", "a.csv")]).is_ok());

        if let Some(home) = std::env::var_os("HOME") {
            let spelled_out = format!("{}/output/a.csv", home.to_string_lossy());
            assert!(validate_distinct_paths(&[("a", "~/output/a.csv"), ("b", &spelled_out)]).is_err());
        }
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("./work/./raw.csv"), "work/raw.csv");
        assert_eq!(normalize_location("/tmp/work/../raw.csv"), "/tmp/raw.csv");
        assert_eq!(normalize_location("/../raw.csv"), "/raw.csv");
        assert_eq!(normalize_location("../raw.csv"), "../raw.csv");
        assert_eq!(
            normalize_location("https://example.com/./a.csv"),
            "https://example.com/./a.csv"
        );
    }
}
