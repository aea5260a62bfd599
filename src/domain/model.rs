use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const LOAN_ID: &str = "Loan ID";
pub const CUSTOMER_ID: &str = "Customer ID";
pub const CREDIT_SCORE: &str = "Credit Score";
pub const ANNUAL_INCOME: &str = "Annual Income";
pub const CURRENT_LOAN_AMOUNT: &str = "Current Loan Amount";

/// Columns of the customer dimension, in output order.
pub const CUSTOMER_COLUMNS: [&str; 3] = [CUSTOMER_ID, CREDIT_SCORE, ANNUAL_INCOME];

/// Placeholder the source system writes when the loan amount is unknown.
pub const LOAN_AMOUNT_SENTINEL: f64 = 99999999.0;

/// Credit scores above this value were recorded with an extra trailing digit.
pub const CREDIT_SCORE_CEILING: f64 = 1000.0;

/// Cell spellings the source reader treats as "no value".
pub const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    NA_VALUES.contains(&cell.trim())
}

/// Parses a numeric cell. Missing cells are `Ok(None)`, anything else that is
/// not a number is returned back as `Err` with the offending text.
pub fn parse_number(cell: &str) -> std::result::Result<Option<f64>, &str> {
    if is_missing(cell) {
        return Ok(None);
    }
    cell.trim().parse::<f64>().map(Some).map_err(|_| cell)
}

/// Cell `index` of `row`, or empty when the row stops short of it.
pub fn cell_at(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Interpretation of a `Current Loan Amount` cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoanAmount {
    Known(f64),
    /// The cell held exactly the sentinel value.
    Unknown,
    /// Empty or non-numeric cell.
    Absent,
}

impl LoanAmount {
    pub fn from_cell(cell: &str) -> Self {
        match parse_number(cell) {
            Ok(Some(value)) if value == LOAN_AMOUNT_SENTINEL => LoanAmount::Unknown,
            Ok(Some(value)) => LoanAmount::Known(value),
            Ok(None) | Err(_) => LoanAmount::Absent,
        }
    }
}

/// An in-memory CSV table: one header row plus string cells.
///
/// Cells are kept as the text read from disk so columns the pipeline never
/// inspects are written back byte-for-byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Looks up every named column, failing with the full list of absentees.
    pub fn require_columns(&self, table: &str, names: &[&str]) -> Result<Vec<usize>> {
        let mut indices = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for name in names {
            match self.column_index(name) {
                Some(index) => indices.push(index),
                None => missing.push((*name).to_string()),
            }
        }

        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(EtlError::MalformedInputError {
                table: table.to_string(),
                missing,
            })
        }
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| cell_at(row, index))
                .collect(),
        )
    }
}

/// The five pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Retrieve,
    Clean,
    Transform,
    Load,
    QualityCheck,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Retrieve,
        Stage::Clean,
        Stage::Transform,
        Stage::Load,
        Stage::QualityCheck,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Retrieve => "retrieve",
            Stage::Clean => "clean",
            Stage::Transform => "transform",
            Stage::Load => "load",
            Stage::QualityCheck => "quality_check",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress of a run. Each state has at most one successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Start,
    Retrieved,
    Cleaned,
    Transformed,
    Loaded,
    Checked,
    End,
}

impl PipelineState {
    /// The stage that has to succeed to leave this state.
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Start => Some(Stage::Retrieve),
            PipelineState::Retrieved => Some(Stage::Clean),
            PipelineState::Cleaned => Some(Stage::Transform),
            PipelineState::Transformed => Some(Stage::Load),
            PipelineState::Loaded => Some(Stage::QualityCheck),
            PipelineState::Checked | PipelineState::End => None,
        }
    }

    pub fn advance(self) -> PipelineState {
        match self {
            PipelineState::Start => PipelineState::Retrieved,
            PipelineState::Retrieved => PipelineState::Cleaned,
            PipelineState::Cleaned => PipelineState::Transformed,
            PipelineState::Transformed => PipelineState::Loaded,
            PipelineState::Loaded => PipelineState::Checked,
            PipelineState::Checked | PipelineState::End => PipelineState::End,
        }
    }
}

/// What a stage read and wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageOutput {
    pub rows_in: usize,
    pub rows_out: usize,
    pub outputs: Vec<String>,
}
