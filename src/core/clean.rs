use crate::core::table_io::{read_table, write_table};
use crate::core::{StageOutput, Storage, Table};
use crate::domain::model::{
    is_missing, parse_number, LoanAmount, CREDIT_SCORE, CREDIT_SCORE_CEILING,
    CURRENT_LOAN_AMOUNT,
};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;

/// Row counts for each cleaning rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub rows_in: usize,
    pub empty_rows: usize,
    pub sentinel_rows: usize,
    pub rescaled_scores: usize,
    pub dropped_scores: usize,
    pub rows_out: usize,
}

#[derive(Debug, PartialEq)]
enum ScoreFix {
    Keep,
    Rescale(String),
    Drop,
}

/// Scores above the ceiling that end in zero carry an extra digit and are
/// divided by ten; any other score above the ceiling is unrecoverable.
fn assess_credit_score(cell: &str) -> std::result::Result<ScoreFix, &str> {
    let fix = match parse_number(cell)? {
        Some(score) if score > CREDIT_SCORE_CEILING && score % 10.0 == 0.0 => {
            ScoreFix::Rescale(format_like(cell, (score / 10.0).floor()))
        }
        Some(score) if score > CREDIT_SCORE_CEILING => ScoreFix::Drop,
        _ => ScoreFix::Keep,
    };
    Ok(fix)
}

/// Writes `value` the way `original` was written: `7350` -> `735`, `7350.0` -> `735.0`.
fn format_like(original: &str, value: f64) -> String {
    let original = original.trim();
    if original.contains(&['.', 'e', 'E'][..]) {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Applies the cleaning rules in order:
///
/// 1. rows where every cell is missing are dropped;
/// 2. rows whose `Current Loan Amount` equals the sentinel are dropped;
/// 3. `Credit Score` values above 1000 ending in zero are divided by ten,
///    other values above 1000 drop their row.
///
/// Rows are never deduplicated here; repeated `Loan ID`s are left for the
/// quality gate.
pub fn clean_with_summary(table: Table) -> Result<(Table, CleanSummary)> {
    let indices = table.require_columns("raw table", &[CURRENT_LOAN_AMOUNT, CREDIT_SCORE])?;
    let (amount_index, score_index) = (indices[0], indices[1]);

    let Table { headers, rows } = table;
    let width = headers.len();
    let mut summary = CleanSummary {
        rows_in: rows.len(),
        ..Default::default()
    };
    let mut kept = Vec::with_capacity(rows.len());

    for (position, mut row) in rows.into_iter().enumerate() {
        if row.len() < width {
            row.resize(width, String::new());
        }

        if row.iter().all(|cell| is_missing(cell)) {
            summary.empty_rows += 1;
            continue;
        }

        if LoanAmount::from_cell(&row[amount_index]) == LoanAmount::Unknown {
            summary.sentinel_rows += 1;
            continue;
        }

        let fix = assess_credit_score(&row[score_index]).map_err(|value| {
            EtlError::InvalidValueError {
                column: CREDIT_SCORE.to_string(),
                row: position + 1,
                value: value.to_string(),
            }
        })?;

        match fix {
            ScoreFix::Keep => {}
            ScoreFix::Rescale(score) => {
                summary.rescaled_scores += 1;
                row[score_index] = score;
            }
            ScoreFix::Drop => {
                summary.dropped_scores += 1;
                continue;
            }
        }

        kept.push(row);
    }

    summary.rows_out = kept.len();
    Ok((Table::with_rows(headers, kept), summary))
}

pub fn clean(table: Table) -> Result<Table> {
    clean_with_summary(table).map(|(cleaned, _)| cleaned)
}

pub async fn clean_data<S: Storage>(
    storage: &S,
    input_path: &str,
    output_path: &str,
) -> Result<StageOutput> {
    let raw = read_table(storage, input_path).await?;
    let (cleaned, summary) = clean_with_summary(raw)?;

    tracing::info!(
        "🧹 Cleaned {} -> {} rows (empty: {}, unknown loan amount: {}, credit score rescaled: {}, credit score dropped: {})",
        summary.rows_in,
        summary.rows_out,
        summary.empty_rows,
        summary.sentinel_rows,
        summary.rescaled_scores,
        summary.dropped_scores
    );

    write_table(storage, output_path, &cleaned).await?;

    Ok(StageOutput {
        rows_in: summary.rows_in,
        rows_out: summary.rows_out,
        outputs: vec![output_path.to_string()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table_io::parse_table;
    use crate::core::test_support::MockStorage;

    const HEADER: &str = "Loan ID,Customer ID,Credit Score,Annual Income,Current Loan Amount";

    fn table(body: &str) -> Table {
        parse_table(format!("{}\n{}", HEADER, body).as_bytes(), "test").unwrap()
    }

    fn scores(table: &Table) -> Vec<&str> {
        table.column(CREDIT_SCORE).unwrap()
    }

    #[test]
    fn test_end_to_end_rows() {
        let raw = table(
            "L1,C1,7350,50000,10000\n\
             L2,C2,1234,60000,99999999.0\n\
             L3,C3,1235,70000,20000\n",
        );

        let (cleaned, summary) = clean_with_summary(raw).unwrap();

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.cell(0, "Loan ID"), Some("L1"));
        assert_eq!(cleaned.cell(0, CREDIT_SCORE), Some("735"));
        assert_eq!(summary.sentinel_rows, 1);
        assert_eq!(summary.dropped_scores, 1);
        assert_eq!(summary.rescaled_scores, 1);
    }

    #[test]
    fn test_empty_rows_are_dropped() {
        let raw = table("L1,C1,700,50000,10000\n,,,,\nNA,,nan,,\n");

        let (cleaned, summary) = clean_with_summary(raw).unwrap();

        assert_eq!(cleaned.len(), 1);
        assert_eq!(summary.empty_rows, 2);
    }

    #[test]
    fn test_sentinel_uses_exact_equality() {
        let raw = table(
            "L1,C1,700,50000,99999999.0\n\
             L2,C2,700,50000,99999999\n\
             L3,C3,700,50000,99999998.99\n\
             L4,C4,700,50000,\n",
        );

        let cleaned = clean(raw).unwrap();

        let ids = cleaned.column("Loan ID").unwrap();
        assert_eq!(ids, vec!["L3", "L4"]);
    }

    #[test]
    fn test_credit_score_rules() {
        let raw = table(
            "L1,C1,1000,1,1\n\
             L2,C2,1010,1,1\n\
             L3,C3,1011,1,1\n\
             L4,C4,8500.0,1,1\n\
             L5,C5,,1,1\n\
             L6,C6,650,1,1\n",
        );

        let cleaned = clean(raw).unwrap();

        assert_eq!(
            cleaned.column("Loan ID").unwrap(),
            vec!["L1", "L2", "L4", "L5", "L6"]
        );
        assert_eq!(scores(&cleaned), vec!["1000", "101", "850.0", "", "650"]);
    }

    #[test]
    fn test_duplicate_loan_ids_are_kept() {
        let raw = table("L1,C1,700,50000,10000\nL1,C1,700,50000,10000\n");
        assert_eq!(clean(raw).unwrap().len(), 2);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let raw = table(
            "L1,C1,7350,50000,10000\n\
             L2,C2,1234,60000,99999999.0\n\
             L3,C3,1235,70000,20000\n\
             L4,C4,720,,15000\n\
             ,,,,\n\
             L5,C5,6900.0,42000,99999999\n\
             L6,C6,,38000,12000\n",
        );

        let once = clean(raw).unwrap();
        let twice = clean(once.clone()).unwrap();

        assert_eq!(once, twice);
        for amount in once.column(CURRENT_LOAN_AMOUNT).unwrap() {
            assert_ne!(LoanAmount::from_cell(amount), LoanAmount::Unknown);
        }
        for score in scores(&once) {
            if let Ok(Some(score)) = parse_number(score) {
                assert!(score <= CREDIT_SCORE_CEILING);
            }
        }
    }

    #[test]
    fn test_scores_above_ten_thousand_are_divided_once() {
        let raw = table("L1,C1,100000,50000,10000\n");

        let once = clean(raw).unwrap();
        assert_eq!(scores(&once), vec!["10000"]);

        // 一次只除以十，第二輪會再縮一次
        let twice = clean(once).unwrap();
        assert_eq!(scores(&twice), vec!["1000"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let headers = vec![
            "Loan ID".to_string(),
            CREDIT_SCORE.to_string(),
            CURRENT_LOAN_AMOUNT.to_string(),
        ];
        let raw = Table::with_rows(
            headers,
            vec![
                vec!["L1".to_string()],
                vec!["L2".to_string(), "7350".to_string()],
                vec![],
            ],
        );

        let (cleaned, summary) = clean_with_summary(raw).unwrap();

        assert_eq!(summary.empty_rows, 1);
        assert_eq!(
            cleaned.rows,
            vec![vec!["L1", "", ""], vec!["L2", "735", ""]]
        );
    }

    #[test]
    fn test_missing_required_column() {
        let raw = parse_table(b"Loan ID,Credit Score\nL1,700\n", "test").unwrap();
        let err = clean(raw).unwrap_err();
        match err {
            EtlError::MalformedInputError { missing, .. } => {
                assert_eq!(missing, vec![CURRENT_LOAN_AMOUNT]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_credit_score_is_rejected() {
        let raw = table("L1,C1,700,50000,10000\nL2,C2,excellent,50000,10000\n");
        let err = clean(raw).unwrap_err();
        match err {
            EtlError::InvalidValueError { column, row, value } => {
                assert_eq!(column, CREDIT_SCORE);
                assert_eq!(row, 2);
                assert_eq!(value, "excellent");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_score_on_sentinel_row_is_ignored() {
        let raw = table("L1,C1,unknown,50000,99999999.0\n");
        assert!(clean(raw).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clean_data_reads_and_writes_through_storage() {
        let storage = MockStorage::with_file(
            "raw.csv",
            &format!("{}\nL1,C1,7350,50000,10000\nL3,C3,1235,70000,20000\n", HEADER),
        );

        let output = clean_data(&storage, "raw.csv", "cleaned.csv").await.unwrap();

        assert_eq!(output.rows_in, 2);
        assert_eq!(output.rows_out, 1);
        assert_eq!(
            storage.get_text("cleaned.csv").await.unwrap(),
            format!("{}\nL1,C1,735,50000,10000\n", HEADER)
        );
    }
}
