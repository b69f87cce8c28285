//! Defines the endpoint for fetching a single transaction by its ID.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    transaction::{Transaction, TransactionId, map_transaction_row},
};

/// The state needed to fetch a transaction.
#[derive(Debug, Clone)]
pub struct GetTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for a single transaction.
#[derive(Debug, Serialize)]
pub struct GetTransactionResponse {
    /// The requested transaction.
    pub data: Transaction,
}

/// A route handler for fetching a transaction by its database ID.
///
/// Responds 404 when no non-deleted row has the ID.
pub async fn get_transaction_endpoint(
    State(state): State<GetTransactionState>,
    Path(id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = connection
        .prepare(
            "SELECT id, msisdn, trx_id, trx_date, item, voucher_code, status,
                    created_at, updated_at
             FROM transactions WHERE id = :id AND deleted_at IS NULL",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(Json(GetTransactionResponse { data: transaction }).into_response())
}
