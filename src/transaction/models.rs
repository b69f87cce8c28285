//! The transaction model and its wire/storage date-time formats.

use rusqlite::Row;
use serde::{Deserialize, Serialize};
use time::{
    OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::Error;

/// The database ID of a transaction.
pub type TransactionId = i64;

/// The format used for transaction timestamps in CSV files, JSON bodies and
/// the database: `YYYY-MM-DD HH:MM:SS`.
pub const DATE_TIME_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// The fallback format for date-only values: `YYYY-MM-DD`.
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Serializes [PrimitiveDateTime] fields as [DATE_TIME_FORMAT] strings.
pub mod datetime_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
    use time::PrimitiveDateTime;

    use super::DATE_TIME_FORMAT;

    /// Render `datetime` as a `YYYY-MM-DD HH:MM:SS` string.
    pub fn serialize<S: Serializer>(
        datetime: &PrimitiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let formatted = datetime
            .format(DATE_TIME_FORMAT)
            .map_err(S::Error::custom)?;

        serializer.serialize_str(&formatted)
    }

    /// Parse a `YYYY-MM-DD HH:MM:SS` string.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<PrimitiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;

        PrimitiveDateTime::parse(&text, DATE_TIME_FORMAT).map_err(D::Error::custom)
    }
}

/// Render `datetime` in the storage and wire format.
///
/// # Errors
/// Returns [Error::DateTimeEncode] if the value cannot be formatted.
pub fn encode_datetime(datetime: PrimitiveDateTime) -> Result<String, Error> {
    datetime
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::DateTimeEncode(error.to_string()))
}

/// The current UTC wall-clock time, without an offset.
pub fn now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();

    PrimitiveDateTime::new(now.date(), now.time())
}

/// A voucher/top-up transaction stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The database ID of the transaction.
    pub id: TransactionId,
    /// The subscriber (phone number) the voucher was issued to.
    pub msisdn: String,
    /// The globally unique transaction identifier, the business key for
    /// upserts.
    pub trx_id: String,
    /// When the transaction happened.
    #[serde(with = "datetime_string")]
    pub trx_date: PrimitiveDateTime,
    /// The product that was purchased.
    pub item: String,
    /// The voucher code that was issued.
    pub voucher_code: String,
    /// The integer status code of the transaction.
    pub status: i64,
    /// When the row was first stored.
    #[serde(with = "datetime_string")]
    pub created_at: PrimitiveDateTime,
    /// When the row was last written.
    #[serde(with = "datetime_string")]
    pub updated_at: PrimitiveDateTime,
}

/// A validated transaction candidate that has not been assigned an ID yet.
///
/// Produced by the CSV record validator and by the JSON create endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The subscriber (phone number) the voucher was issued to.
    pub msisdn: String,
    /// The globally unique transaction identifier.
    pub trx_id: String,
    /// When the transaction happened.
    #[serde(with = "datetime_string")]
    pub trx_date: PrimitiveDateTime,
    /// The product that was purchased.
    pub item: String,
    /// The voucher code that was issued.
    pub voucher_code: String,
    /// The integer status code of the transaction.
    pub status: i64,
}

/// Convert a `transactions` row into a [Transaction].
///
/// Expects the columns `id, msisdn, trx_id, trx_date, item, voucher_code,
/// status, created_at, updated_at` in that order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        msisdn: row.get(1)?,
        trx_id: row.get(2)?,
        trx_date: datetime_column(row, 3)?,
        item: row.get(4)?,
        voucher_code: row.get(5)?,
        status: row.get(6)?,
        created_at: datetime_column(row, 7)?,
        updated_at: datetime_column(row, 8)?,
    })
}

fn datetime_column(row: &Row, index: usize) -> Result<PrimitiveDateTime, rusqlite::Error> {
    let text: String = row.get(index)?;

    PrimitiveDateTime::parse(&text, DATE_TIME_FORMAT).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })
}
