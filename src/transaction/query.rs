//! Dynamic filter construction shared by the transaction page fetch and
//! count queries.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Deserialize;
use time::Date;

use crate::Error;

use super::models::{DATE_FORMAT, Transaction, encode_datetime, map_transaction_row};

/// The recognized query parameters for listing transactions.
///
/// Every parameter is optional. Values that fail to parse (status, dates)
/// are ignored rather than surfaced as errors.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Case-insensitive substring matched against the subscriber, transaction
    /// identifier, item and voucher code.
    pub search: Option<String>,
    /// Exact match on the subscriber.
    pub msisdn: Option<String>,
    /// Exact match on the integer status code.
    pub status: Option<String>,
    /// Inclusive lower bound on the transaction date, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Inclusive upper bound on the transaction date, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Case-insensitive substring match on the item label.
    pub item: Option<String>,
    /// The 1-indexed page to return.
    pub page: Option<String>,
    /// The maximum number of rows per page.
    pub limit: Option<String>,
}

/// The composed filter applied to both the page fetch and the count query.
///
/// The predicate is rendered once per call and bound to both queries, which
/// keeps `pagination.total` consistent with the page of data it accompanies.
/// Soft-deleted rows are always excluded.
#[derive(Debug, Default)]
pub struct TransactionFilter {
    /// Case-insensitive substring matched against the subscriber, transaction
    /// identifier, item and voucher code.
    pub search: Option<String>,
    /// Exact match on the subscriber.
    pub msisdn: Option<String>,
    /// Exact match on the status code.
    pub status: Option<i64>,
    /// Inclusive lower bound on the transaction date.
    pub start_date: Option<Date>,
    /// Inclusive upper bound on the transaction date. Extended to the last
    /// second of the day so date-only bounds behave inclusively.
    pub end_date: Option<Date>,
    /// Case-insensitive substring match on the item label.
    pub item: Option<String>,
}

impl TransactionFilter {
    /// Build a filter from raw query parameters.
    ///
    /// An unparsable status or date is silently dropped from the filter set.
    pub fn from_params(params: &ListParams) -> Self {
        Self {
            search: params.search.clone(),
            msisdn: params.msisdn.clone(),
            status: params.status.as_deref().and_then(|text| text.parse().ok()),
            start_date: params
                .start_date
                .as_deref()
                .and_then(|text| Date::parse(text, DATE_FORMAT).ok()),
            end_date: params
                .end_date
                .as_deref()
                .and_then(|text| Date::parse(text, DATE_FORMAT).ok()),
            item: params.item.clone(),
        }
    }

    /// Render the WHERE clause and its bound parameters.
    ///
    /// Active filters are AND-combined; the search term forms a single
    /// OR-group over the four text columns.
    fn predicate(&self) -> Result<(String, Vec<Value>), Error> {
        let mut clauses = vec!["deleted_at IS NULL".to_owned()];
        let mut parameters: Vec<Value> = Vec::new();

        if let Some(search) = &self.search {
            let pattern = format!("%{}%", search.to_lowercase());
            let first = parameters.len() + 1;
            clauses.push(format!(
                "(LOWER(msisdn) LIKE ?{first} OR LOWER(trx_id) LIKE ?{} \
                 OR LOWER(item) LIKE ?{} OR LOWER(voucher_code) LIKE ?{})",
                first + 1,
                first + 2,
                first + 3,
            ));
            for _ in 0..4 {
                parameters.push(Value::Text(pattern.clone()));
            }
        }

        if let Some(msisdn) = &self.msisdn {
            clauses.push(format!("msisdn = ?{}", parameters.len() + 1));
            parameters.push(Value::Text(msisdn.clone()));
        }

        if let Some(status) = self.status {
            clauses.push(format!("status = ?{}", parameters.len() + 1));
            parameters.push(Value::Integer(status));
        }

        if let Some(start_date) = self.start_date {
            clauses.push(format!("trx_date >= ?{}", parameters.len() + 1));
            parameters.push(Value::Text(encode_datetime(start_date.midnight())?));
        }

        if let Some(end_date) = self.end_date {
            let end_of_day = end_date
                .with_hms(23, 59, 59)
                .map_err(|error| Error::DateTimeEncode(error.to_string()))?;
            clauses.push(format!("trx_date <= ?{}", parameters.len() + 1));
            parameters.push(Value::Text(encode_datetime(end_of_day)?));
        }

        if let Some(item) = &self.item {
            clauses.push(format!("LOWER(item) LIKE ?{}", parameters.len() + 1));
            parameters.push(Value::Text(format!("%{}%", item.to_lowercase())));
        }

        Ok((format!("WHERE {}", clauses.join(" AND ")), parameters))
    }

    /// Fetch one page of matching transactions, most recent first.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the query fails.
    pub fn fetch_page(
        &self,
        offset: u64,
        limit: u64,
        connection: &Connection,
    ) -> Result<Vec<Transaction>, Error> {
        let (where_clause, parameters) = self.predicate()?;
        let query = format!(
            "SELECT id, msisdn, trx_id, trx_date, item, voucher_code, status,
                    created_at, updated_at
             FROM transactions {where_clause}
             ORDER BY trx_date DESC
             LIMIT {limit} OFFSET {offset}"
        );

        connection
            .prepare(&query)?
            .query_map(params_from_iter(parameters.iter()), map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    /// Count every transaction matching the filter, across all pages.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the query fails.
    pub fn count(&self, connection: &Connection) -> Result<u64, Error> {
        let (where_clause, parameters) = self.predicate()?;
        let query = format!("SELECT COUNT(id) FROM transactions {where_clause}");

        connection
            .prepare(&query)?
            .query_row(params_from_iter(parameters.iter()), |row| {
                row.get::<_, i64>(0).map(|count| count as u64)
            })
            .map_err(Error::from)
    }
}

/// The total number of non-deleted transactions in the store.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn count_transactions(connection: &Connection) -> Result<u64, Error> {
    TransactionFilter::default().count(connection)
}
