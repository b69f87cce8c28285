//! Defines the endpoint for importing transactions from an uploaded CSV file.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    body::Bytes,
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{AppState, Error};

use super::batch::{ImportSummary, import_csv};

/// The multipart form field that carries the CSV file.
const CSV_FILE_FIELD: &str = "csv_file";

/// The state needed for importing transactions.
#[derive(Debug, Clone)]
pub struct UploadCsvState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UploadCsvState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for a completed CSV upload.
#[derive(Debug, Serialize)]
pub struct UploadCsvResponse {
    /// Human-readable outcome.
    pub message: String,
    /// The name of the uploaded file.
    pub filename: String,
    /// The batch outcome, flattened into the response.
    #[serde(flatten)]
    pub summary: ImportSummary,
}

/// A route handler for importing transactions from an uploaded CSV file.
///
/// Expects a multipart form with a `csv_file` field whose file name ends in
/// `.csv` (case-insensitive). Responds 200 when every row imported, 206 when
/// some rows failed (the body lists them), and 400 when the file itself is
/// missing, not a CSV, unreadable or empty. Rows committed before a row-level
/// failure stay committed.
pub async fn upload_csv_endpoint(
    State(state): State<UploadCsvState>,
    mut multipart: Multipart,
) -> Result<Response, Error> {
    let (filename, data) = read_csv_field(&mut multipart).await?;
    tracing::debug!("Received file '{}' that is {} bytes", filename, data.len());

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let summary = import_csv(data.as_ref(), &connection)?;

    let status_code = if summary.error_count > 0 {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    Ok((
        status_code,
        Json(UploadCsvResponse {
            message: "CSV upload completed".to_owned(),
            filename,
            summary,
        }),
    )
        .into_response())
}

async fn read_csv_field(multipart: &mut Multipart) -> Result<(String, Bytes), Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        if field.name() != Some(CSV_FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| Error::MultipartError("missing file name".to_owned()))?
            .to_owned();

        if !filename.to_lowercase().ends_with(".csv") {
            return Err(Error::NotCsv);
        }

        let data = field
            .bytes()
            .await
            .map_err(|error| Error::MultipartError(error.to_string()))?;

        return Ok((filename, data));
    }

    Err(Error::MultipartError(format!(
        "missing form field '{CSV_FILE_FIELD}'"
    )))
}

#[cfg(test)]
mod upload_csv_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{FromRequest, Multipart, State},
        http::{Request, StatusCode},
        response::{IntoResponse, Response},
    };
    use rusqlite::Connection;

    use crate::{db::initialize, endpoints, transaction::count_transactions};

    use super::{UploadCsvState, upload_csv_endpoint};

    fn get_test_state() -> UploadCsvState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        UploadCsvState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    async fn must_make_multipart(field_name: &str, filename: &str, csv_data: &str) -> Multipart {
        let boundary = "MY_BOUNDARY123456789";

        let lines = [
            format!("--{boundary}"),
            format!(
                "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{filename}\""
            ),
            "Content-Type: text/csv".to_owned(),
            "".to_owned(),
            csv_data.to_owned(),
            format!("--{boundary}--"),
        ];

        let data = lines.join("\r\n").into_bytes();

        let request = Request::builder()
            .method("POST")
            .uri(endpoints::UPLOAD)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(data.into())
            .unwrap();

        Multipart::from_request(request, &{}).await.unwrap()
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn clean_file_returns_200_with_summary() {
        let state = get_test_state();
        let csv_data = "\
            6281110001,TRX001,2024-01-14 09:00:00,Data 1GB,VC-A1,0\n\
            6281110002,TRX002,2024-01-15 12:30:00,Data 5GB,VC-B2,1";

        let response = upload_csv_endpoint(
            State(state.clone()),
            must_make_multipart("csv_file", "transactions.csv", csv_data).await,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["filename"], "transactions.csv");
        assert_eq!(json["total_rows"], 2);
        assert_eq!(json["success_count"], 2);
        assert_eq!(json["error_count"], 0);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection), Ok(2));
    }

    #[tokio::test]
    async fn partially_failing_file_returns_206_with_error_rows() {
        let state = get_test_state();
        let csv_data = "\
            6281110001,TRX001,2024-01-14 09:00:00,Data 1GB,VC-A1,0\n\
            6281110002,TRX002,not-a-date,Data 5GB,VC-B2,1";

        let response = upload_csv_endpoint(
            State(state.clone()),
            must_make_multipart("csv_file", "transactions.csv", csv_data).await,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        let json = response_json(response).await;
        assert_eq!(json["success_count"], 1);
        assert_eq!(json["error_count"], 1);
        assert_eq!(json["errors"][0]["row"], 2);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection), Ok(1));
    }

    #[tokio::test]
    async fn uppercase_csv_suffix_is_accepted() {
        let state = get_test_state();
        let csv_data = "6281110001,TRX001,2024-01-14 09:00:00,Data 1GB,VC-A1,0";

        let response = upload_csv_endpoint(
            State(state),
            must_make_multipart("csv_file", "TRANSACTIONS.CSV", csv_data).await,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn non_csv_file_name_returns_400() {
        let state = get_test_state();

        let error = upload_csv_endpoint(
            State(state.clone()),
            must_make_multipart("csv_file", "transactions.txt", "a,b,c").await,
        )
        .await
        .unwrap_err();

        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(&connection), Ok(0));
    }

    #[tokio::test]
    async fn missing_csv_field_returns_400() {
        let state = get_test_state();

        let error = upload_csv_endpoint(
            State(state),
            must_make_multipart("attachment", "transactions.csv", "a,b,c").await,
        )
        .await
        .unwrap_err();

        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_file_returns_400() {
        let state = get_test_state();

        let error = upload_csv_endpoint(
            State(state),
            must_make_multipart("csv_file", "transactions.csv", "").await,
        )
        .await
        .unwrap_err();

        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
