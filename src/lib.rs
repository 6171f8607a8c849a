//! In-memory resource registry with per-request latency metrics.
//!
//! ```text
//! request ─▶ TraceLayer ─▶ track_metrics ─▶ CORS ─▶ handlers ─▶ Registry
//!                              │
//!                              └─▶ PathGeneralizer ─▶ LatencyHistogram
//! ```

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod registry;
pub mod server;

use std::sync::Arc;

use crate::config::{ConfigError, ServiceConfig};
use crate::metrics::{LatencyHistogram, PathGeneralizer};
use crate::middleware::Interceptor;
use crate::registry::Registry;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// The only shared mutable store; handlers get clones of its records.
    pub registry: Arc<Registry>,

    /// Process-wide latency histogram. The interceptor writes, the metrics
    /// endpoints read.
    pub histogram: Arc<LatencyHistogram>,

    /// Scraped by `GET /metrics`. Owned here rather than the global default
    /// registry, so every `AppState` counts on its own.
    pub metrics_registry: prometheus::Registry,

    /// Feeds `histogram`; installed as middleware by `server::create_router`.
    pub interceptor: Interceptor,
}

impl AppState {
    /// `histogram` must already be registered in `metrics_registry`.
    pub fn new(
        registry: Arc<Registry>,
        metrics_registry: prometheus::Registry,
        histogram: Arc<LatencyHistogram>,
        generalizer: PathGeneralizer,
    ) -> Self {
        let interceptor = Interceptor::new(Arc::new(generalizer), histogram.clone());
        Self {
            registry,
            histogram,
            metrics_registry,
            interceptor,
        }
    }

    /// Empty registry plus a histogram and rule table built from `config`.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let generalizer = config.metrics.generalizer()?;
        let metrics_registry = prometheus::Registry::new();
        let histogram = Arc::new(LatencyHistogram::new(
            config.metrics.buckets.clone(),
            &metrics_registry,
        )?);
        Ok(Self::new(
            Arc::new(Registry::new()),
            metrics_registry,
            histogram,
            generalizer,
        ))
    }
}
