//! The idempotent upsert engine keyed on the transaction identifier.

use rusqlite::{Connection, OptionalExtension};

use crate::Error;

use super::models::{
    NewTransaction, Transaction, TransactionId, encode_datetime, map_transaction_row, now_utc,
};

/// Insert `candidate` as a new row, or update the existing row that carries
/// the same transaction identifier.
///
/// The existence check and the write run inside a single SQLite transaction,
/// so exactly one store mutation happens per successful call and two
/// concurrent imports of the same transaction identifier cannot both insert.
/// The partial unique index on `trx_id` remains the backstop for writers on
/// other connections; a constraint violation surfaces as [Error::InsertFailed]
/// for that row.
///
/// The update branch preserves the row's ID and creation timestamp and
/// rewrites every other field from `candidate`.
///
/// # Errors
/// - [Error::UpdateFailed] if the existing row could not be rewritten.
/// - [Error::InsertFailed] if the new row could not be written.
/// - [Error::SqlError] for any other SQL failure.
pub fn upsert_transaction(
    candidate: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let tx = connection.unchecked_transaction()?;

    let existing_id: Option<TransactionId> = tx
        .prepare("SELECT id FROM transactions WHERE trx_id = :trx_id AND deleted_at IS NULL")?
        .query_row(&[(":trx_id", &candidate.trx_id)], |row| row.get(0))
        .optional()?;

    let stored = match existing_id {
        Some(id) => update_transaction(id, &candidate, &tx)?,
        None => insert_transaction(candidate, &tx)?,
    };

    tx.commit()?;

    Ok(stored)
}

/// Insert `candidate` as a new transaction row.
///
/// # Errors
/// Returns [Error::InsertFailed] if the row could not be written, including
/// when the transaction identifier already exists.
pub fn insert_transaction(
    candidate: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = encode_datetime(now_utc())?;

    connection
        .prepare(
            "INSERT INTO transactions
                (msisdn, trx_id, trx_date, item, voucher_code, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, msisdn, trx_id, trx_date, item, voucher_code, status,
                       created_at, updated_at",
        )?
        .query_row(
            (
                &candidate.msisdn,
                &candidate.trx_id,
                encode_datetime(candidate.trx_date)?,
                &candidate.item,
                &candidate.voucher_code,
                candidate.status,
                &now,
                &now,
            ),
            map_transaction_row,
        )
        .map_err(|error| Error::InsertFailed(candidate.trx_id.clone(), error))
}

fn update_transaction(
    id: TransactionId,
    candidate: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "UPDATE transactions
             SET msisdn = ?1, trx_date = ?2, item = ?3, voucher_code = ?4, status = ?5,
                 updated_at = ?6
             WHERE id = ?7
             RETURNING id, msisdn, trx_id, trx_date, item, voucher_code, status,
                       created_at, updated_at",
        )?
        .query_row(
            (
                &candidate.msisdn,
                encode_datetime(candidate.trx_date)?,
                &candidate.item,
                &candidate.voucher_code,
                candidate.status,
                encode_datetime(now_utc())?,
                id,
            ),
            map_transaction_row,
        )
        .map_err(|error| Error::UpdateFailed(candidate.trx_id.clone(), error))
}
