use crate::adapters::http::{remote_url, HttpSource};
use crate::core::table_io::{parse_table, write_table};
use crate::core::{StageOutput, Storage};
use crate::utils::error::Result;

/// Copies the source dataset to the working location without changing it.
///
/// The source is either a path understood by `storage` or an `http(s)` URL.
/// It is parsed before being written so an unreadable source never produces a
/// working copy.
pub async fn retrieve_data<S: Storage>(
    storage: &S,
    http: &HttpSource,
    input_path: &str,
    output_path: &str,
) -> Result<StageOutput> {
    let data = match remote_url(input_path) {
        Some(url) => http.fetch(&url).await?,
        None => storage.read_file(input_path).await?,
    };

    let table = parse_table(&data, input_path)?;
    tracing::info!(
        "📥 Retrieved {} rows ({} columns) from {}",
        table.len(),
        table.headers.len(),
        input_path
    );

    write_table(storage, output_path, &table).await?;

    Ok(StageOutput {
        rows_in: table.len(),
        rows_out: table.len(),
        outputs: vec![output_path.to_string()],
    })
}
