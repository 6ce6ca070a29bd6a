//! Read side of the connection log.

use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::store::StoreError;

/// One data row keyed by the header's column names.
pub type LogRecord = BTreeMap<String, String>;

/// Parses the whole log file on every call.
#[derive(Debug, Clone)]
pub struct LogReader {
    path: PathBuf,
}

impl LogReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All data rows, oldest first.
    pub async fn read_all(&self) -> Result<Vec<LogRecord>, StoreError> {
        let bytes = tokio::fs::read(&self.path).await?;
        parse_records(&bytes)
    }
}

/// Parse raw log bytes. The first row is the header; an empty input or a
/// header without rows yields no records.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<LogRecord>, StoreError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = reader.records();
    let header = match rows.next() {
        Some(row) => row?,
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for row in rows {
        let row = row?;
        let record: LogRecord = header
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        records.push(record);
    }
    Ok(records)
}
