//! The batch importer driving CSV records through validation and upsert.

use std::io::Read;

use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    transaction::{parse_record, upsert_transaction},
};

/// One failed row in a batch import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    /// The 1-indexed row number in file order.
    pub row: usize,
    /// Why the row was rejected.
    pub reason: String,
}

/// The aggregate outcome of a batch import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// How many rows the file contained.
    pub total_rows: usize,
    /// How many rows were upserted.
    pub success_count: usize,
    /// How many rows were rejected.
    pub error_count: usize,
    /// The rejected rows, in file order.
    pub errors: Vec<RowError>,
}

impl ImportSummary {
    fn record_error(&mut self, row: usize, error: Error) {
        self.error_count += 1;
        self.errors.push(RowError {
            row,
            reason: error.to_string(),
        });
    }
}

/// Import CSV data, one record at a time.
///
/// Records stream from `reader`, so memory use does not depend on file size.
/// Every record is treated as data; a header row, if present, will simply be
/// rejected by validation and recorded as a row error. Each row that passes
/// validation is upserted and committed independently; a row failure is
/// recorded and the batch continues, and rows committed before any terminal
/// failure stay committed.
///
/// # Errors
/// - [Error::MalformedCsv] if the CSV structure itself cannot be read.
/// - [Error::EmptyFile] if the data contains no records at all.
pub fn import_csv<R: Read>(reader: R, connection: &Connection) -> Result<ImportSummary, Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut summary = ImportSummary::default();

    for (index, record_result) in csv_reader.records().enumerate() {
        let record = record_result.map_err(|error| Error::MalformedCsv(error.to_string()))?;
        let row = index + 1;
        summary.total_rows += 1;

        match parse_record(&record)
            .and_then(|candidate| upsert_transaction(candidate, connection))
        {
            Ok(_) => summary.success_count += 1,
            Err(error) => summary.record_error(row, error),
        }
    }

    if summary.total_rows == 0 {
        return Err(Error::EmptyFile);
    }

    Ok(summary)
}
