use std::sync::Arc;

use crate::config::ServerConfig;
use crate::upload::UploadStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: deskline_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Flat attachment directory.
    pub uploads: Arc<UploadStore>,
}
