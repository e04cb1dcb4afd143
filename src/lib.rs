pub mod composer;
pub mod config;
pub mod error;
pub mod model;
pub mod refresh;
pub mod rest;
pub mod storage;
pub mod threads;

use std::sync::Arc;

use config::ServerConfig;
use refresh::ThreadCache;
use storage::Storage;

/// Shared application state passed to every route handler and background
/// task.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub storage: Arc<Storage>,
    /// Sequence-tagged snapshot cache kept warm by the refresh task.
    pub thread_cache: Arc<ThreadCache>,
    /// Shared HTTP client for the draft-generation endpoint.
    pub http: reqwest::Client,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub async fn new(config: ServerConfig) -> anyhow::Result<Arc<Self>> {
        let storage = Storage::new_with_slow_query(&config.data_dir, config.slow_query_ms).await?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.draft.timeout_secs))
            .build()?;
        Ok(Arc::new(Self {
            config: Arc::new(config),
            storage: Arc::new(storage),
            thread_cache: Arc::new(ThreadCache::new()),
            http,
            started_at: std::time::Instant::now(),
        }))
    }
}
