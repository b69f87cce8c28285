//! Imports a local CSV file once at process start.

use std::{fs::File, io::BufReader, path::Path};

use rusqlite::Connection;

use crate::Error;

use super::batch::{ImportSummary, import_csv};

/// Import the CSV file at `path` if it exists.
///
/// This is a best-effort bootstrap: whatever happens, startup continues.
/// Row-level errors are logged and do not stop the import; a missing,
/// unreadable, malformed or empty file is logged once and swallowed.
///
/// Returns the batch summary when the file was processed, `None` otherwise.
pub fn bootstrap_import(path: &Path, connection: &Connection) -> Option<ImportSummary> {
    if !path.exists() {
        tracing::info!("CSV file not found: {}", path.display());
        return None;
    }

    tracing::info!("Found CSV file: {}, loading data...", path.display());

    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) => {
            let error = Error::FileOpenError(error.to_string());
            tracing::warn!("Could not import {}: {error}", path.display());
            return None;
        }
    };

    match import_csv(BufReader::new(file), connection) {
        Ok(summary) => {
            if summary.error_count > 0 {
                tracing::warn!(
                    "Imported {} of {} rows from {}; {} rows failed",
                    summary.success_count,
                    summary.total_rows,
                    path.display(),
                    summary.error_count,
                );
                for row_error in &summary.errors {
                    tracing::debug!("Row {}: {}", row_error.row, row_error.reason);
                }
            } else {
                tracing::info!(
                    "Imported {} rows from {}",
                    summary.success_count,
                    path.display(),
                );
            }

            Some(summary)
        }
        Err(error) => {
            tracing::warn!("Could not import {}: {error}", path.display());
            None
        }
    }
}
