use crate::core::table_io::{read_table, write_table};
use crate::core::{StageOutput, Storage, Table};
use crate::domain::model::{cell_at, is_missing, parse_number, CUSTOMER_COLUMNS, CUSTOMER_ID};
use crate::utils::error::Result;
use std::collections::HashSet;

/// How a projected cell takes part in customer dedup.
#[derive(Debug, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Missing,
    Number(u64),
    Text(&'a str),
}

impl<'a> CellKey<'a> {
    fn id(cell: &'a str) -> Self {
        if is_missing(cell) {
            CellKey::Missing
        } else {
            CellKey::Text(cell)
        }
    }

    /// `735` and `735.0` are the same value.
    fn value(cell: &'a str) -> Self {
        match parse_number(cell) {
            Ok(None) => CellKey::Missing,
            Ok(Some(value)) if value == 0.0 => CellKey::Number(0f64.to_bits()),
            Ok(Some(value)) => CellKey::Number(value.to_bits()),
            Err(_) => CellKey::Text(cell),
        }
    }
}

/// Splits the cleaned table into the customer dimension and the loan fact table.
///
/// The customer table is the `Customer ID, Credit Score, Annual Income`
/// projection with duplicate rows removed (first occurrence wins, input order
/// kept). Score and income compare by numeric value, so `735` and `735.0` are
/// one customer; the text of the first occurrence is what gets written. Rows
/// that share a `Customer ID` but differ in score or income stay separate.
/// Missing cells compare equal to each other. The loan table is the input,
/// untouched.
pub fn transform(cleaned: Table) -> Result<(Table, Table)> {
    let indices = cleaned.require_columns("cleaned table", &CUSTOMER_COLUMNS)?;

    let mut customers = Table::new(CUSTOMER_COLUMNS.iter().map(|c| c.to_string()).collect());
    {
        let mut seen: HashSet<Vec<CellKey>> = HashSet::new();
        for row in &cleaned.rows {
            let key: Vec<CellKey> = CUSTOMER_COLUMNS
                .iter()
                .zip(&indices)
                .map(|(&column, &i)| {
                    let cell = cell_at(row, i);
                    if column == CUSTOMER_ID {
                        CellKey::id(cell)
                    } else {
                        CellKey::value(cell)
                    }
                })
                .collect();

            if seen.insert(key) {
                customers
                    .rows
                    .push(indices.iter().map(|&i| cell_at(row, i).to_string()).collect());
            }
        }
    }

    Ok((customers, cleaned))
}

pub async fn transform_data<S: Storage>(
    storage: &S,
    input_path: &str,
    customer_output_path: &str,
    loan_output_path: &str,
) -> Result<StageOutput> {
    let cleaned = read_table(storage, input_path).await?;
    let rows_in = cleaned.len();
    let (customers, loans) = transform(cleaned)?;

    tracing::info!(
        "🔀 Transformed {} rows into {} customers and {} loans",
        rows_in,
        customers.len(),
        loans.len()
    );

    write_table(storage, customer_output_path, &customers).await?;
    write_table(storage, loan_output_path, &loans).await?;

    Ok(StageOutput {
        rows_in,
        rows_out: customers.len() + loans.len(),
        outputs: vec![
            customer_output_path.to_string(),
            loan_output_path.to_string(),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table_io::parse_table;
    use crate::core::test_support::MockStorage;
    use crate::utils::error::EtlError;

    fn cleaned() -> Table {
        parse_table(
            b"Loan ID,Customer ID,Credit Score,Annual Income,Term\n\
              L1,C1,735,50000,Short Term\n\
              L2,C1,735,50000,Long Term\n\
              L3,C1,702,50000,Short Term\n\
              L4,C2,,,Short Term\n\
              L5,C2,NaN,,Long Term\n",
            "test",
        )
        .unwrap()
    }

    #[test]
    fn test_customer_projection_is_deduplicated() {
        let (customers, _) = transform(cleaned()).unwrap();

        assert_eq!(customers.headers, CUSTOMER_COLUMNS.to_vec());
        assert_eq!(
            customers.rows,
            vec![
                vec!["C1", "735", "50000"],
                vec!["C1", "702", "50000"],
                vec!["C2", "", ""],
            ]
        );
    }

    #[test]
    fn test_customers_compare_by_numeric_value() {
        let input = parse_table(
            b"Loan ID,Customer ID,Credit Score,Annual Income\n\
              L1,C1,735,50000\n\
              L2,C1,735.0,50000.0\n\
              L3,C1,7.35e2,5e4\n\
              L4,C2,0,-0.0\n\
              L5,C2,0.0,0\n",
            "test",
        )
        .unwrap();

        let (customers, loans) = transform(input).unwrap();

        assert_eq!(
            customers.rows,
            vec![vec!["C1", "735", "50000"], vec!["C2", "0", "-0.0"]]
        );
        assert_eq!(loans.len(), 5);
    }

    #[test]
    fn test_rescaled_scores_collapse_into_one_customer() {
        let raw = parse_table(
            b"Loan ID,Customer ID,Credit Score,Annual Income,Current Loan Amount\n\
              L1,C1,7350,50000,10000\n\
              L2,C1,735.0,50000,12000\n",
            "test",
        )
        .unwrap();

        let cleaned = crate::core::clean::clean(raw).unwrap();
        let (customers, _) = transform(cleaned).unwrap();

        assert_eq!(customers.rows, vec![vec!["C1", "735", "50000"]]);
    }

    #[test]
    fn test_short_rows_do_not_panic() {
        let input = Table::with_rows(
            vec![
                "Loan ID".to_string(),
                "Customer ID".to_string(),
                "Credit Score".to_string(),
                "Annual Income".to_string(),
            ],
            vec![
                vec!["L1".to_string(), "C1".to_string()],
                vec!["L2".to_string(), "C1".to_string(), "".to_string()],
                vec![],
            ],
        );

        let (customers, _) = transform(input).unwrap();

        assert_eq!(customers.rows, vec![vec!["C1", "", ""], vec!["", "", ""]]);
    }

    #[test]
    fn test_loan_table_is_passthrough() {
        let input = cleaned();
        let (_, loans) = transform(input.clone()).unwrap();
        assert_eq!(loans, input);
    }

    #[test]
    fn test_missing_projection_column() {
        let input = parse_table(b"Loan ID,Customer ID,Credit Score\nL1,C1,700\n", "test").unwrap();
        let err = transform(input).unwrap_err();
        match err {
            EtlError::MalformedInputError { missing, .. } => {
                assert_eq!(missing, vec!["Annual Income"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transform_data_writes_both_tables() {
        let storage = MockStorage::with_file(
            "cleaned.csv",
            "Loan ID,Customer ID,Credit Score,Annual Income\nL1,C1,735,50000\nL2,C1,735,50000\n",
        );

        let output = transform_data(&storage, "cleaned.csv", "customer.csv", "loan.csv")
            .await
            .unwrap();

        assert_eq!(output.rows_in, 2);
        assert_eq!(output.outputs, vec!["customer.csv", "loan.csv"]);
        assert_eq!(
            storage.get_text("customer.csv").await.unwrap(),
            "Customer ID,Credit Score,Annual Income\nC1,735,50000\n"
        );
        assert_eq!(
            storage.get_text("loan.csv").await.unwrap(),
            "Loan ID,Customer ID,Credit Score,Annual Income\nL1,C1,735,50000\nL2,C1,735,50000\n"
        );
    }
}
