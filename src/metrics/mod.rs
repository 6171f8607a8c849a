//! Request latency metrics.
//!
//! ```text
//! interceptor ──Observation──▶ ObservationSink (LatencyHistogram)
//!                                 ├─▶ HistogramVec ─▶ encode_text()  GET /metrics
//!                                 └─▶ HDR series  ─▶ snapshot()      GET /api/metrics
//! ```

pub mod generalizer;
pub mod histogram;
pub mod percentiles;

use std::time::Duration;

pub use generalizer::{PathGeneralizer, PathRule, PatternError};
pub use histogram::{
    encode_text, HistogramSnapshot, LatencyHistogram, SeriesSnapshot, DEFAULT_BUCKETS,
};
pub use percentiles::PercentileSet;

/// One timed request, already labelled with its generalized path.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// e.g. "GET"
    pub method: String,
    /// e.g. "/api/resources/*"
    pub path: String,
    pub status: u16,
    pub elapsed: Duration,
}

/// Anything that can absorb observations from many requests at once.
pub trait ObservationSink: Send + Sync + 'static {
    fn observe(&self, observation: Observation);
}
