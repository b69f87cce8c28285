//! CSV batch import: the streaming row pipeline, the HTTP upload endpoint
//! and the startup bootstrap importer.

mod batch;
mod bootstrap;
mod upload_endpoint;

pub use batch::{ImportSummary, RowError, import_csv};
pub use bootstrap::bootstrap_import;
pub use upload_endpoint::upload_csv_endpoint;
