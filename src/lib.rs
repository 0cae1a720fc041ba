//! Core Web Vitals collection and aggregation service.
//!
//! Pages (or the `vitals-replay` tool, from recorded traces) post rated
//! metric samples; the server keeps the most recent ones in a bounded buffer
//! and answers raw and statistical queries. A small link-preview generator
//! rides along.

use std::sync::Arc;

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod observer;
pub mod preview;
pub mod server;

use config::AppConfig;
use metrics::MetricsStore;
use preview::PreviewProfile;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    pub config: AppConfig,

    /// Sample buffer. Ingest appends; queries and the SSE feed read.
    pub store: Arc<MetricsStore>,

    /// Preview copy, rooted at the configured or local base URL.
    pub preview: PreviewProfile,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let base_url = config
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", config.bind_addr.port()));

        Self {
            store: Arc::new(MetricsStore::with_capacity(config.buffer_capacity)),
            preview: PreviewProfile::new(base_url),
            config,
        }
    }
}
