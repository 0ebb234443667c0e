use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::watch;

use crate::monitor::QualitySnapshot;
use crate::Config;

/// Shared state handed to every handler via `State<AppState>`.
///
/// Cheap to clone: the pool and receiver are handles, config is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    // ---
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Latest snapshot published by the quality monitor.
    pub quality: watch::Receiver<Option<QualitySnapshot>>,
}
