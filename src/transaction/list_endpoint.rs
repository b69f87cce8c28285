//! Defines the endpoint for listing transactions with filters and paging.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    pagination::{Pagination, PaginationConfig, page_offset},
    transaction::{ListParams, Transaction, TransactionFilter},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The paging defaults applied when a request omits page or limit.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The response body for a page of transactions.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// The page of matching transactions, most recent first.
    pub data: Vec<Transaction>,
    /// Paging metadata; `total` counts every row matching the same filters.
    pub pagination: Pagination,
}

/// A route handler for listing transactions.
///
/// Filters are described in [TransactionFilter::from_params]. The same
/// composed filter drives both the page fetch and the total count, so the
/// paging metadata always reflects the filter set of the returned data.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Query(params): Query<ListParams>,
) -> Result<Response, Error> {
    let filter = TransactionFilter::from_params(&params);
    let page = params
        .page
        .as_deref()
        .and_then(|text| text.parse().ok())
        .unwrap_or(state.pagination_config.default_page);
    let limit = params
        .limit
        .as_deref()
        .and_then(|text| text.parse().ok())
        .unwrap_or(state.pagination_config.default_limit);

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let data = filter.fetch_page(page_offset(page, limit), limit, &connection)?;
    let total = filter.count(&connection)?;

    Ok(Json(ListTransactionsResponse {
        data,
        pagination: Pagination { page, limit, total },
    })
    .into_response())
}

#[cfg(test)]
mod list_transactions_endpoint_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::Value;
    use time::macros::datetime;

    use crate::{
        AppState, build_router, endpoints,
        transaction::{NewTransaction, insert_transaction},
    };

    fn get_test_server() -> TestServer {
        let conn = Connection::open_in_memory().unwrap();
        let state = AppState::new(conn).expect("Could not create app state");

        seed(&state);

        TestServer::new(build_router(state))
    }

    fn seed(state: &AppState) {
        let connection = state.db_connection.lock().unwrap();
        let rows = [
            ("6281110001", "TRX001", datetime!(2024-01-14 09:00:00), "Data 1GB", "VC-A1", 0),
            ("6281110002", "TRX002", datetime!(2024-01-15 12:30:00), "Data 5GB", "VC-B2", 1),
            ("6281110002", "TRX003", datetime!(2024-01-15 23:59:59), "Voice 60min", "VC-C3", 1),
        ];

        for (msisdn, trx_id, trx_date, item, voucher_code, status) in rows {
            insert_transaction(
                NewTransaction {
                    msisdn: msisdn.to_owned(),
                    trx_id: trx_id.to_owned(),
                    trx_date,
                    item: item.to_owned(),
                    voucher_code: voucher_code.to_owned(),
                    status,
                },
                &connection,
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn lists_all_transactions_with_default_paging() {
        let server = get_test_server();

        let response = server.get(endpoints::TRANSACTIONS).await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
        assert_eq!(json["pagination"]["page"], 1);
        assert_eq!(json["pagination"]["limit"], 1000);
        assert_eq!(json["pagination"]["total"], 3);
    }

    #[tokio::test]
    async fn total_reflects_the_filter_not_the_page() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("status", "1")
            .add_query_param("limit", "1")
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        assert_eq!(json["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn search_filters_across_text_columns() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("search", "voice")
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["pagination"]["total"], 1);
        assert_eq!(json["data"][0]["trx_id"], "TRX003");
    }

    #[tokio::test]
    async fn date_range_bounds_are_inclusive() {
        let server = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("start_date", "2024-01-15")
            .add_query_param("end_date", "2024-01-15")
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn results_are_ordered_most_recent_first() {
        let server = get_test_server();

        let response = server.get(endpoints::TRANSACTIONS).await;

        let json: Value = response.json();
        let trx_ids: Vec<&str> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["trx_id"].as_str().unwrap())
            .collect();
        assert_eq!(trx_ids, ["TRX003", "TRX002", "TRX001"]);
    }
}
