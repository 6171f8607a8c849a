use hdrhistogram::Histogram;
use serde::Serialize;

/// Latency summary of one series, in microseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentileSet {
    pub min_us: u64,
    pub max_us: u64,
    pub mean_us: f64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub p999_us: u64,
}

impl PercentileSet {
    /// Zeroed when the histogram has no samples yet.
    pub fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.is_empty() {
            return Self::default();
        }

        Self {
            min_us: hist.min(),
            max_us: hist.max(),
            mean_us: hist.mean(),
            p50_us: hist.value_at_quantile(0.50),
            p95_us: hist.value_at_quantile(0.95),
            p99_us: hist.value_at_quantile(0.99),
            p999_us: hist.value_at_quantile(0.999),
        }
    }
}
