use crate::core::table_io::read_table;
use crate::core::{StageOutput, Storage, Table};
use crate::domain::model::{cell_at, is_missing, LOAN_ID};
use crate::utils::error::{DuplicateKey, EtlError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Outcome of a passed uniqueness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub column: String,
    pub rows_checked: usize,
    pub distinct_values: usize,
}

impl QualityReport {
    pub fn message(&self) -> String {
        format!(
            "Data quality check passed: No duplicates in the '{}' column.",
            self.column
        )
    }
}

/// Fails with `DuplicateKeyError` when any `Loan ID` appears more than once.
///
/// Offenders are reported in order of first appearance. Missing ids count as
/// the same value.
pub fn check_duplicates(loans: &Table) -> Result<QualityReport> {
    let index = loans.require_columns("loan table", &[LOAN_ID])?[0];

    let mut counts: HashMap<Option<&str>, usize> = HashMap::new();
    let mut order: Vec<Option<&str>> = Vec::new();
    for row in &loans.rows {
        let cell = cell_at(row, index);
        let key = Some(cell).filter(|c| !is_missing(c));
        let count = counts.entry(key).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    let duplicates: Vec<DuplicateKey> = order
        .iter()
        .filter_map(|key| {
            let count = counts[key];
            (count > 1).then(|| DuplicateKey {
                value: key.map(str::to_string),
                count,
            })
        })
        .collect();

    if !duplicates.is_empty() {
        return Err(EtlError::DuplicateKeyError {
            column: LOAN_ID.to_string(),
            duplicates,
        });
    }

    Ok(QualityReport {
        column: LOAN_ID.to_string(),
        rows_checked: loans.len(),
        distinct_values: order.len(),
    })
}

/// Terminal gate: reads the final loan table and aborts on repeated ids.
pub async fn check_for_duplicates<S: Storage>(storage: &S, input_path: &str) -> Result<StageOutput> {
    let loans = read_table(storage, input_path).await?;

    match check_duplicates(&loans) {
        Ok(report) => {
            tracing::info!("✅ {} ({} rows)", report.message(), report.rows_checked);
            println!("{}", report.message());
            Ok(StageOutput {
                rows_in: report.rows_checked,
                rows_out: report.rows_checked,
                outputs: Vec::new(),
            })
        }
        Err(e) => {
            tracing::error!("❌ {}", e);
            Err(e)
        }
    }
}
