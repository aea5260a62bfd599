use crate::adapters::http::remote_url;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_distinct_paths, validate_file_extension, validate_non_empty_string, validate_path,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PIPELINE_NAME: &str = "loan_data_pipeline";
pub const DEFAULT_SOURCE: &str = "~/code/credit_analysis/credit_train.csv";
pub const DEFAULT_WORK_DIR: &str = "/tmp";
pub const DEFAULT_OUTPUT_DIR: &str = "~/output";

pub const RAW_FILE: &str = "raw_data.csv";
pub const CLEANED_FILE: &str = "cleaned_data.csv";
pub const CUSTOMER_FILE: &str = "customer_data.csv";
pub const LOAN_FILE: &str = "loan_data.csv";
pub const FINAL_CUSTOMER_FILE: &str = "final_customer.csv";
pub const FINAL_LOAN_FILE: &str = "final_loan.csv";

fn join(dir: &str, file: &str) -> String {
    Path::new(dir).join(file).to_string_lossy().into_owned()
}

/// Source and handoff locations for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinePaths {
    pub name: String,
    pub source: String,
    pub raw: String,
    pub cleaned: String,
    pub customer: String,
    pub loan: String,
    pub final_customer: String,
    pub final_loan: String,
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self {
            name: DEFAULT_PIPELINE_NAME.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            raw: join(DEFAULT_WORK_DIR, RAW_FILE),
            cleaned: join(DEFAULT_WORK_DIR, CLEANED_FILE),
            customer: join(DEFAULT_WORK_DIR, CUSTOMER_FILE),
            loan: join(DEFAULT_WORK_DIR, LOAN_FILE),
            final_customer: join(DEFAULT_OUTPUT_DIR, FINAL_CUSTOMER_FILE),
            final_loan: join(DEFAULT_OUTPUT_DIR, FINAL_LOAN_FILE),
        }
    }
}

impl PipelinePaths {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Places the four intermediate tables under `dir`.
    pub fn in_work_dir(mut self, dir: &str) -> Self {
        self.raw = join(dir, RAW_FILE);
        self.cleaned = join(dir, CLEANED_FILE);
        self.customer = join(dir, CUSTOMER_FILE);
        self.loan = join(dir, LOAN_FILE);
        self
    }

    /// Places the two final tables under `dir`.
    pub fn in_output_dir(mut self, dir: &str) -> Self {
        self.final_customer = join(dir, FINAL_CUSTOMER_FILE);
        self.final_loan = join(dir, FINAL_LOAN_FILE);
        self
    }

    /// Every location a stage writes to, labelled with its config key.
    pub fn outputs(&self) -> [(&'static str, &str); 6] {
        [
            ("paths.raw", self.raw.as_str()),
            ("paths.cleaned", self.cleaned.as_str()),
            ("paths.customer", self.customer.as_str()),
            ("paths.loan", self.loan.as_str()),
            ("paths.final_customer", self.final_customer.as_str()),
            ("paths.final_loan", self.final_loan.as_str()),
        ]
    }
}

/// Checks a location a stage reads from: a URL or a path.
pub fn validate_source(field: &str, source: &str) -> Result<()> {
    if remote_url(source).is_some() || source.contains("://") {
        validate_url(field, source)
    } else {
        validate_path(field, source)
    }
}

/// Checks a location a stage writes a table to.
pub fn validate_output(field: &str, path: &str) -> Result<()> {
    validate_path(field, path)?;
    validate_file_extension(field, path, &["csv"])
}

impl Validate for PipelinePaths {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("pipeline.name", &self.name)?;
        validate_source("paths.source", &self.source)?;

        let outputs = self.outputs();
        for (field, path) in outputs {
            validate_output(field, path)?;
        }

        let mut locations = vec![("paths.source", self.source.as_str())];
        locations.extend(outputs);
        validate_distinct_paths(&locations)
    }
}

impl ConfigProvider for PipelinePaths {
    fn pipeline_name(&self) -> &str {
        &self.name
    }

    fn source_path(&self) -> &str {
        &self.source
    }

    fn raw_path(&self) -> &str {
        &self.raw
    }

    fn cleaned_path(&self) -> &str {
        &self.cleaned
    }

    fn customer_path(&self) -> &str {
        &self.customer
    }

    fn loan_path(&self) -> &str {
        &self.loan
    }

    fn final_customer_path(&self) -> &str {
        &self.final_customer
    }

    fn final_loan_path(&self) -> &str {
        &self.final_loan
    }
}
