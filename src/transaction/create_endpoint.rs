//! Defines the endpoint for creating a single transaction from a JSON body.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    transaction::{NewTransaction, Transaction, insert_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body for a successfully created transaction.
#[derive(Debug, Serialize)]
pub struct CreateTransactionResponse {
    /// Human-readable outcome.
    pub message: String,
    /// The stored transaction, including its assigned ID.
    pub data: Transaction,
}

/// A route handler for creating a new transaction from a JSON body.
///
/// Responds 201 with the created record, 400 when the body does not bind to
/// a transaction, and 500 when the store rejects the write (for example a
/// duplicate transaction identifier).
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(candidate) =
        payload.map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let transaction = insert_transaction(candidate, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTransactionResponse {
            message: "Transaction created successfully".to_owned(),
            data: transaction,
        }),
    )
        .into_response())
}
