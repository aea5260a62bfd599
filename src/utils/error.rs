use crate::domain::model::Stage;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A key value that occurs more than once in a column that must be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    /// `None` when the cell was missing.
    pub value: Option<String>,
    pub count: usize,
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{} (x{})", value, self.count),
            None => write!(f, "<missing> (x{})", self.count),
        }
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailableError { path: String, reason: String },

    #[error("Malformed input in {table}: missing column(s) {}", .missing.join(", "))]
    MalformedInputError { table: String, missing: Vec<String> },

    #[error("Malformed input: column '{column}' row {row} holds non-numeric value '{value}'")]
    InvalidValueError {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Destination unwritable: {path}: {reason}")]
    DestinationUnwritableError { path: String, reason: String },

    #[error(
        "Data quality check failed: Duplicates found in the '{column}' column: {}",
        format_duplicates(.duplicates)
    )]
    DuplicateKeyError {
        column: String,
        duplicates: Vec<DuplicateKey>,
    },

    #[error("Stage '{stage}' failed: {source}")]
    StageFailedError {
        stage: Stage,
        #[source]
        source: Box<EtlError>,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

fn format_duplicates(duplicates: &[DuplicateKey]) -> String {
    const SHOWN: usize = 10;
    let mut listed: Vec<String> = duplicates.iter().take(SHOWN).map(|d| d.to_string()).collect();
    if duplicates.len() > SHOWN {
        listed.push(format!("... and {} more", duplicates.len() - SHOWN));
    }
    listed.join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Source,
    Schema,
    Destination,
    Quality,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Worth re-running once the input becomes available.
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn source_unavailable(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::SourceUnavailableError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn destination_unwritable(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::DestinationUnwritableError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// The error that actually stopped the run, looking through stage wrappers.
    pub fn root(&self) -> &EtlError {
        match self {
            Self::StageFailedError { source, .. } => source.root(),
            other => other,
        }
    }

    /// The stage the run halted at, if the error came out of the engine.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::StageFailedError { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            Self::SourceUnavailableError { .. } => ErrorCategory::Source,
            Self::MalformedInputError { .. } | Self::InvalidValueError { .. } | Self::CsvError(_) => {
                ErrorCategory::Schema
            }
            Self::DestinationUnwritableError { .. } | Self::IoError(_) => ErrorCategory::Destination,
            Self::DuplicateKeyError { .. } => ErrorCategory::Quality,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_) | Self::StageFailedError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Source => ErrorSeverity::Medium,
            ErrorCategory::Schema | ErrorCategory::Quality | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Destination | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root() {
            Self::SourceUnavailableError { .. } => {
                "Check that the source file exists, is readable and is a valid CSV with a header row"
            }
            Self::MalformedInputError { .. } => {
                "Make sure the input CSV carries the expected column names (case-sensitive)"
            }
            Self::InvalidValueError { .. } | Self::CsvError(_) => {
                "Fix or remove the offending row in the input file and re-run"
            }
            Self::DestinationUnwritableError { .. } | Self::IoError(_) => {
                "Check permissions and free space at the output location, then discard partial outputs and re-run"
            }
            Self::DuplicateKeyError { .. } => {
                "Inspect the source data for repeated Loan IDs; the run was stopped at the quality gate"
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => "Review the configuration file and command-line flags",
            Self::SerializationError(_) | Self::StageFailedError { .. } => {
                "Re-run with --verbose and report the log output"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.failed_stage() {
            Some(stage) => format!("Pipeline failed at stage '{}': {}", stage, self.root()),
            None => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
