use crate::core::{Storage, Table};
use crate::utils::error::{EtlError, Result};

/// Decodes CSV bytes with a mandatory header row.
///
/// Rows shorter than the header are padded with empty cells. A row wider than
/// the header, an empty file, or invalid UTF-8 make the source unreadable.
pub fn parse_table(data: &[u8], origin: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| EtlError::source_unavailable(origin, e))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err(EtlError::source_unavailable(
            origin,
            "no columns to parse from file",
        ));
    }

    let width = headers.len();
    let mut table = Table::new(headers);

    for record in reader.records() {
        let record = record.map_err(|e| EtlError::source_unavailable(origin, e))?;
        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(EtlError::source_unavailable(
                origin,
                format!(
                    "expected {} fields on line {}, saw {}",
                    width,
                    line,
                    record.len()
                ),
            ));
        }

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        table.rows.push(row);
    }

    Ok(table)
}

/// Encodes a table as CSV: header row first, no index column.
pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

pub async fn read_table<S: Storage>(storage: &S, path: &str) -> Result<Table> {
    let data = storage.read_file(path).await?;
    let table = parse_table(&data, path)?;
    tracing::debug!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.headers.len(),
        path
    );
    Ok(table)
}

pub async fn write_table<S: Storage>(storage: &S, path: &str, table: &Table) -> Result<()> {
    let data = to_csv_bytes(table)?;
    storage.write_file(path, &data).await?;
    tracing::debug!("Wrote {} rows ({} bytes) to {}", table.len(), data.len(), path);
    Ok(())
}
