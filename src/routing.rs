//! Application router configuration.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, endpoints,
    import::upload_csv_endpoint,
    transaction::{
        clear_transactions_endpoint, create_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint,
    },
};

/// The largest multipart upload accepted, in bytes.
const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::UPLOAD, post(upload_csv_endpoint))
        .route(endpoints::CLEAR, delete(clear_transactions_endpoint))
        .route(endpoints::TRANSACTION, get(get_transaction_endpoint))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors_layer())
        .with_state(state)
}

/// CORS rules for the admin frontend served from another origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60))
}
