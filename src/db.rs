//! Sets up the SQLite schema for the application.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::Error;

/// Create the `transactions` table and its indexes if they do not exist.
///
/// The transaction identifier is only unique among rows that have not been
/// soft-deleted, hence the partial unique index.
///
/// # Errors
/// Returns [Error::SqlError] if the schema could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    transaction.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                msisdn TEXT NOT NULL,
                trx_id TEXT NOT NULL,
                trx_date TEXT NOT NULL,
                item TEXT NOT NULL,
                voucher_code TEXT NOT NULL,
                status INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
                )",
        (),
    )?;

    transaction.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_transactions_trx_id
             ON transactions (trx_id) WHERE deleted_at IS NULL",
        (),
    )?;
    transaction.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_msisdn ON transactions (msisdn)",
        (),
    )?;
    transaction.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_trx_date ON transactions (trx_date)",
        (),
    )?;
    transaction.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_status ON transactions (status)",
        (),
    )?;
    transaction.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_deleted_at ON transactions (deleted_at)",
        (),
    )?;

    transaction.commit()?;

    Ok(())
}
