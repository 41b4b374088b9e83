//! taskwall-server: SQLite-backed board store and its HTTP API.
//!
//! The store is the sole owner of the connection pool and the only
//! place SQL lives; the http module maps routes onto it and typed
//! errors onto status codes.

pub mod http;
pub mod store;

pub use http::{run_server, AppState, ServerConfig};
pub use store::{BoardStore, StoreError};
