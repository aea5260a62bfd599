use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};

/// Filesystem storage rooted at `base_path`.
///
/// Absolute paths ignore the base; `~` and `~/...` resolve against `$HOME`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(expand_home(path))
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".".to_string())
    }
}

pub fn expand_home(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        tokio::fs::read(&full_path)
            .await
            .map_err(|e| EtlError::source_unavailable(full_path.display().to_string(), e))
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        let unwritable = |e: std::io::Error| {
            EtlError::destination_unwritable(full_path.display().to_string(), e)
        };

        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(unwritable)?;
            }
        }

        tokio::fs::write(&full_path, data).await.map_err(unwritable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage
            .write_file("output/final_loan.csv", b"Loan ID\nL1\n")
            .await
            .unwrap();

        let data = storage.read_file("output/final_loan.csv").await.unwrap();
        assert_eq!(data, b"Loan ID\nL1\n");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_source_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        let err = storage.read_file("missing.csv").await.unwrap_err();
        assert!(matches!(err, EtlError::SourceUnavailableError { .. }));
    }

    #[tokio::test]
    async fn test_write_under_a_file_is_destination_unwritable() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        storage.write_file("blocker", b"x").await.unwrap();

        let err = storage
            .write_file("blocker/final_loan.csv", b"Loan ID\n")
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::DestinationUnwritableError { .. }));
    }

    #[test]
    fn test_absolute_paths_ignore_base() {
        let storage = LocalStorage::new("/srv/etl".to_string());
        assert_eq!(storage.resolve("/tmp/raw_data.csv"), PathBuf::from("/tmp/raw_data.csv"));
        assert_eq!(storage.resolve("raw_data.csv"), PathBuf::from("/srv/etl/raw_data.csv"));
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(
                expand_home("~/output/final_loan.csv"),
                PathBuf::from(home).join("output/final_loan.csv")
            );
        }
        assert_eq!(expand_home("/tmp/x.csv"), PathBuf::from("/tmp/x.csv"));
        assert_eq!(expand_home("~user/x.csv"), PathBuf::from("~user/x.csv"));
    }
}
