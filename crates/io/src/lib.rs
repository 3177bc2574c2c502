//! `tabletalk-io` — File ingestion.
//!
//! Decodes spreadsheet/CSV bytes into a raw cell grid (row 0 = header)
//! and builds the engine's [`Dataset`] from it. Ingestion failure is
//! fatal to the upload: no partial dataset is ever produced.

pub mod csv;
pub mod error;
pub mod xlsx;

use tabletalk_engine::{Dataset, Value};

pub use error::IngestError;

/// Decoded cell grid before type inference. Row 0 of the source file is
/// the header; data rows align positionally with it.
#[derive(Debug)]
pub struct RawGrid {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Decode file bytes into a raw grid, dispatching on the file extension.
pub fn decode_bytes(file_name: &str, bytes: &[u8]) -> Result<RawGrid, IngestError> {
    if bytes.is_empty() {
        return Err(IngestError::EmptyFile(file_name.to_string()));
    }

    let ext = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    let grid = match ext.as_str() {
        "xlsx" | "xls" | "xlsb" | "ods" => xlsx::decode(bytes)?,
        "csv" | "tsv" | "txt" => csv::decode(bytes)?,
        other => return Err(IngestError::UnsupportedFormat(other.to_string())),
    };

    if grid.rows.is_empty() && grid.header.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::EmptyFile(file_name.to_string()));
    }

    Ok(grid)
}

/// Decode bytes and build the dataset in one step. This is the upload
/// entry point hosts call.
pub fn ingest(file_name: &str, bytes: &[u8]) -> Result<Dataset, IngestError> {
    let grid = decode_bytes(file_name, bytes)?;
    Ok(Dataset::build(file_name, grid.header, grid.rows)?)
}

/// Read and ingest a file from disk.
pub fn ingest_path(path: &std::path::Path) -> Result<Dataset, IngestError> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::Io(e.to_string()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    ingest(&file_name, &bytes)
}
