//! The transaction model, row validation, the idempotent upsert engine, the
//! query filter builder and the transaction CRUD endpoints.

mod clear_endpoint;
mod create_endpoint;
mod get_endpoint;
mod list_endpoint;
mod models;
mod query;
mod record;
mod upsert;

pub use clear_endpoint::clear_transactions_endpoint;
pub use create_endpoint::create_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use models::{
    DATE_FORMAT, DATE_TIME_FORMAT, NewTransaction, Transaction, TransactionId, datetime_string,
    encode_datetime, map_transaction_row, now_utc,
};
pub use query::{ListParams, TransactionFilter, count_transactions};
pub use record::{RECORD_FIELD_COUNT, parse_record};
pub use upsert::{insert_transaction, upsert_transaction};
