use std::collections::BTreeMap;

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use prometheus::{Encoder, HistogramOpts, HistogramVec, Registry, TextEncoder};
use serde::Serialize;

use super::percentiles::PercentileSet;
use super::{Observation, ObservationSink};

// ─── Configuration ───────────────────────────────────────────────

pub const METRIC_NAME: &str = "http_request_duration_seconds";
const METRIC_HELP: &str = "Duration of HTTP request in seconds";
const LABELS: &[&str] = &["method", "path", "status"];

/// Upper bounds in seconds: the 1-2-5 ladder from 100 µs to 50 s.
pub const DEFAULT_BUCKETS: &[f64] = &[
    0.0001, 0.0002, 0.0005, 0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0,
    10.0, 20.0, 50.0,
];

/// HdrHistogram range: 1 μs → 60 s, 3 significant figures
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = 60_000_000;
const HIST_SIGFIG: u8 = 3;

// ─── Public types ────────────────────────────────────────────────

/// Request latency keyed by `(method, path, status)`.
///
/// Bucket counts live in a Prometheus `HistogramVec` registered in the
/// caller's registry; an HDR histogram per series backs the percentile
/// summary served as JSON.
pub struct LatencyHistogram {
    durations: HistogramVec,
    series: Mutex<BTreeMap<SeriesKey, Series>>,
}

/// Aggregate of one label set, shipped by `GET /api/metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSnapshot {
    pub method: String,
    pub path: String,
    pub status: u16,
    pub count: u64,
    pub sum_seconds: f64,
    pub latency: PercentileSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramSnapshot {
    pub total_requests: u64,
    pub series: Vec<SeriesSnapshot>,
}

// ─── Internal state ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SeriesKey {
    method: String,
    path: String,
    status: u16,
}

struct Series {
    /// Child of `durations` for this label set.
    seconds: prometheus::Histogram,
    micros: Histogram<u64>,
}

// ─── LatencyHistogram impl ───────────────────────────────────────

impl LatencyHistogram {
    /// Registers `http_request_duration_seconds` in `registry`.
    ///
    /// Fails when `buckets` is not strictly increasing or the metric is
    /// already registered there.
    pub fn new(buckets: Vec<f64>, registry: &Registry) -> Result<Self, prometheus::Error> {
        let durations = HistogramVec::new(
            HistogramOpts::new(METRIC_NAME, METRIC_HELP).buckets(buckets),
            LABELS,
        )?;
        registry.register(Box::new(durations.clone()))?;

        Ok(Self {
            durations,
            series: Mutex::new(BTreeMap::new()),
        })
    }

    /// Read-only copy of every series, ordered by label set.
    pub fn snapshot(&self) -> HistogramSnapshot {
        let series = self.series.lock();
        let series: Vec<SeriesSnapshot> = series
            .iter()
            .map(|(key, s)| SeriesSnapshot {
                method: key.method.clone(),
                path: key.path.clone(),
                status: key.status,
                count: s.seconds.get_sample_count(),
                sum_seconds: s.seconds.get_sample_sum(),
                latency: PercentileSet::from_histogram(&s.micros),
            })
            .collect();

        HistogramSnapshot {
            total_requests: series.iter().map(|s| s.count).sum(),
            series,
        }
    }
}

impl ObservationSink for LatencyHistogram {
    fn observe(&self, observation: Observation) {
        let seconds = observation.elapsed.as_secs_f64();
        let micros = u64::try_from(observation.elapsed.as_micros()).unwrap_or(u64::MAX);
        let key = SeriesKey {
            method: observation.method,
            path: observation.path,
            status: observation.status,
        };

        let mut series = self.series.lock();
        let entry = series.entry(key).or_insert_with_key(|key| Series {
            seconds: self.durations.with_label_values(&[
                key.method.as_str(),
                key.path.as_str(),
                key.status.to_string().as_str(),
            ]),
            micros: Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
                .expect("static histogram bounds"),
        });
        entry.seconds.observe(seconds);
        entry.micros.saturating_record(micros.max(HIST_LOW));
    }
}

// ─── Exposition ──────────────────────────────────────────────────

/// Everything in `registry`, in the Prometheus text format (0.0.4).
pub fn encode_text(registry: &Registry) -> Result<String, prometheus::Error> {
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
