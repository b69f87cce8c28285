//! Defines the administrative endpoint for deleting all transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error};

/// The state needed to clear the transactions table.
#[derive(Debug, Clone)]
pub struct ClearTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ClearTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters guarding the clear operation.
#[derive(Debug, Deserialize)]
pub struct ClearParams {
    /// Must be the literal `yes` for the deletion to proceed.
    pub confirm: Option<String>,
}

/// The response body after clearing the transactions table.
#[derive(Debug, Serialize)]
pub struct ClearTransactionsResponse {
    /// Human-readable outcome.
    pub message: String,
    /// How many rows were deleted.
    pub deleted_count: usize,
}

/// A route handler that hard-deletes every transaction row.
///
/// The deletion bypasses the soft-delete marker and removes soft-deleted
/// rows as well. Requires the literal query parameter `confirm=yes`;
/// responds 400 otherwise and leaves the table untouched.
pub async fn clear_transactions_endpoint(
    State(state): State<ClearTransactionsState>,
    Query(params): Query<ClearParams>,
) -> Result<Response, Error> {
    if params.confirm.as_deref() != Some("yes") {
        return Err(Error::ConfirmationRequired);
    }

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let deleted_count = connection.execute("DELETE FROM transactions", ())?;

    Ok(Json(ClearTransactionsResponse {
        message: "All transactions cleared successfully".to_owned(),
        deleted_count,
    })
    .into_response())
}
