//! Defines the app level error type and its conversion to JSON HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A CSV row had fewer fields than a transaction record requires.
    ///
    /// Recorded as a row-level error by the batch importer; the batch
    /// continues with the next row.
    #[error("insufficient columns (expected 6, got {0})")]
    InsufficientColumns(usize),

    /// A CSV row carried a transaction date that is neither a date-time
    /// (`YYYY-MM-DD HH:MM:SS`) nor a plain date (`YYYY-MM-DD`).
    #[error("invalid date format '{0}'")]
    InvalidDateFormat(String),

    /// A CSV row carried a status value that is not an integer.
    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    /// A date-time value could not be rendered in the storage format.
    #[error("could not format date-time: {0}")]
    DateTimeEncode(String),

    /// A new row could not be written for the named transaction identifier.
    ///
    /// This includes unique-constraint violations when two imports race on
    /// the same transaction identifier; the loser reports this error for its
    /// row and the batch carries on.
    #[error("failed to create transaction '{0}': {1}")]
    InsertFailed(String, rusqlite::Error),

    /// An existing row could not be updated for the named transaction
    /// identifier.
    #[error("failed to update transaction '{0}': {1}")]
    UpdateFailed(String, rusqlite::Error),

    /// The requested transaction could not be found.
    #[error("Transaction not found")]
    NotFound,

    /// The uploaded file name does not have a `.csv` suffix.
    #[error("File must be a CSV file")]
    NotCsv,

    /// The multipart form was missing the CSV file field or could not be
    /// read.
    #[error("No file uploaded or invalid file: {0}")]
    MultipartError(String),

    /// The CSV data was structurally invalid and reading had to stop.
    #[error("Failed to read CSV file: {0}")]
    MalformedCsv(String),

    /// The CSV file contained no records at all.
    #[error("CSV file is empty")]
    EmptyFile,

    /// The local bootstrap CSV file could not be opened.
    #[error("error opening CSV file: {0}")]
    FileOpenError(String),

    /// The JSON request body could not be parsed as a transaction.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// A destructive operation was requested without its confirmation flag.
    #[error("This action will delete all transactions. Add ?confirm=yes to proceed")]
    ConfirmationRequired,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => Error::SqlError(error),
        }
    }
}

/// The JSON body sent for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, message) = match &self {
            Error::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Error::InsufficientColumns(_)
            | Error::InvalidDateFormat(_)
            | Error::InvalidStatus(_)
            | Error::NotCsv
            | Error::MultipartError(_)
            | Error::MalformedCsv(_)
            | Error::EmptyFile
            | Error::FileOpenError(_)
            | Error::InvalidRequestBody(_)
            | Error::ConfirmationRequired => (StatusCode::BAD_REQUEST, self.to_string()),
            // Store failures are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_owned(),
                )
            }
        };

        (status_code, Json(ErrorBody { error: message })).into_response()
    }
}
