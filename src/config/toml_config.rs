use crate::config::paths::PipelinePaths;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: Option<PipelineConfig>,
    pub paths: Option<PathsConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
}

/// Every key is optional; unset keys keep the default layout.
/// `work_dir` / `output_dir` move whole groups, explicit file keys win over both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub source: Option<String>,
    pub work_dir: Option<String>,
    pub output_dir: Option<String>,
    pub raw: Option<String>,
    pub cleaned: Option<String>,
    pub customer: Option<String>,
    pub loan: Option<String>,
    pub final_customer: Option<String>,
    pub final_loan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| EtlError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LOAN_SOURCE})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// 解析出最終使用的路徑
    pub fn pipeline_paths(&self) -> PipelinePaths {
        let mut paths = PipelinePaths::default();

        if let Some(pipeline) = &self.pipeline {
            paths.name = pipeline.name.clone();
        }

        let Some(config) = &self.paths else {
            return paths;
        };

        if let Some(source) = &config.source {
            paths = paths.with_source(source.clone());
        }
        if let Some(dir) = &config.work_dir {
            paths = paths.in_work_dir(dir);
        }
        if let Some(dir) = &config.output_dir {
            paths = paths.in_output_dir(dir);
        }

        let explicit = [
            (&config.raw, &mut paths.raw),
            (&config.cleaned, &mut paths.cleaned),
            (&config.customer, &mut paths.customer),
            (&config.loan, &mut paths.loan),
            (&config.final_customer, &mut paths.final_customer),
            (&config.final_loan, &mut paths.final_loan),
        ];
        for (value, slot) in explicit {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }

        paths
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.pipeline_paths().validate()
    }
}
