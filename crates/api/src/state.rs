use std::sync::Arc;

use etude_bunny::api::BunnyApi;

use crate::config::ServerConfig;
use crate::storage::FileStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: etude_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Video CDN client; `None` while upload credentials are unset.
    pub bunny: Option<Arc<BunnyApi>>,
    /// Local store for uploaded files (PDFs).
    pub files: FileStore,
}
