//! Service configuration (strict YAML parsing).
//!
//! Every field has a default, so an empty document, or no file at all,
//! yields a working setup:
//!
//! ```yaml
//! server:
//!   listen: "0.0.0.0:8080"
//!   static_dir: "static"
//! registry:
//!   seed_size: 10
//! metrics:
//!   path: "/metrics"
//!   buckets: [0.0001, 0.0002, 0.0005, 0.001, 0.002, 0.005, 0.01, 0.02, 0.05,
//!             0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0]
//!   rules:
//!     - pattern: "/api/resources/**"
//!       label: "/api/resources/*"
//! ```

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::metrics::{PathGeneralizer, PathRule, PatternError, DEFAULT_BUCKETS};
use crate::registry::DEFAULT_SEED_SIZE;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "RESOURCE_REGISTRY_CONFIG";
/// Read when present and `CONFIG_ENV` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "registry.yaml";

/// Paths owned by the API router; the metrics endpoint may not shadow them.
const RESERVED_PREFIXES: &[&str] = &["/api/resources", "/api/metrics"];
const MAX_SEED_SIZE: usize = 1_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path} failed: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("invalid metrics rule: {0}")]
    Rule(#[from] PatternError),
    #[error("metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ─── Schema ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub metrics: MetricsSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Directory served for every path no API route claims.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySection {
    /// Synthetic records created before the listener opens.
    #[serde(default = "default_seed_size")]
    pub seed_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    /// Histogram upper bounds in seconds.
    #[serde(default = "default_buckets")]
    pub buckets: Vec<f64>,
    /// Evaluated in order, first match wins.
    #[serde(default = "PathGeneralizer::default_rules")]
    pub rules: Vec<PathRule>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            seed_size: default_seed_size(),
        }
    }
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            buckets: default_buckets(),
            rules: PathGeneralizer::default_rules(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_static_dir() -> String {
    "static".into()
}
fn default_seed_size() -> usize {
    DEFAULT_SEED_SIZE
}
fn default_metrics_path() -> String {
    "/metrics".into()
}
fn default_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}

// ─── Validation ──────────────────────────────────────────────────

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.registry.validate()?;
        self.metrics.validate()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.server.listen.parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "server.listen must be a socket address, got {:?}",
                self.server.listen
            ))
        })
    }
}

impl ServerSection {
    fn validate(&self) -> Result<()> {
        if self.listen.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "server.listen must be a socket address, got {:?}",
                self.listen
            )));
        }
        if self.static_dir.is_empty() {
            return Err(ConfigError::Invalid("server.static_dir must not be empty".into()));
        }
        Ok(())
    }
}

impl RegistrySection {
    fn validate(&self) -> Result<()> {
        if self.seed_size > MAX_SEED_SIZE {
            return Err(ConfigError::Invalid(format!(
                "registry.seed_size must be at most {MAX_SEED_SIZE}"
            )));
        }
        Ok(())
    }
}

impl MetricsSection {
    fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') || self.path.len() < 2 {
            return Err(ConfigError::Invalid(
                "metrics.path must start with '/' and name a route".into(),
            ));
        }
        let segments: Vec<&str> = self.path[1..].split('/').collect();
        if segments
            .iter()
            .any(|seg| seg.is_empty() || seg.starts_with(':') || seg.starts_with('*'))
        {
            return Err(ConfigError::Invalid(format!(
                "metrics.path {:?} must be a plain route without empty, ':' or '*' segments",
                self.path
            )));
        }
        let collides = RESERVED_PREFIXES.iter().any(|reserved| {
            let reserved: Vec<&str> = reserved[1..].split('/').collect();
            segments.starts_with(&reserved)
        });
        if collides {
            return Err(ConfigError::Invalid(format!(
                "metrics.path {:?} collides with an API route",
                self.path
            )));
        }

        if self.buckets.is_empty() {
            return Err(ConfigError::Invalid("metrics.buckets must not be empty".into()));
        }
        if self.buckets.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(ConfigError::Invalid(
                "metrics.buckets must be finite and positive".into(),
            ));
        }
        if self.buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(
                "metrics.buckets must be strictly increasing".into(),
            ));
        }

        self.generalizer()?;
        Ok(())
    }

    /// Compile `rules` into the runtime matcher.
    pub fn generalizer(&self) -> Result<PathGeneralizer> {
        Ok(PathGeneralizer::new(&self.rules)?)
    }
}

// ─── Loading ─────────────────────────────────────────────────────

/// Resolve the config source: `$RESOURCE_REGISTRY_CONFIG` if set, else
/// `registry.yaml` if it exists, else built-in defaults.
pub fn load() -> Result<ServiceConfig> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return load_from_file(&path);
    }
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        return load_from_file(DEFAULT_CONFIG_PATH);
    }
    tracing::info!("no config file found, using defaults");
    Ok(ServiceConfig::default())
}

pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    let cfg = load_from_str(&s)?;
    tracing::info!(path, "config loaded");
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    // An empty document deserializes as unit, not as an empty mapping.
    let cfg: ServiceConfig = if s.trim().is_empty() {
        ServiceConfig::default()
    } else {
        serde_yaml::from_str(s)?
    };
    cfg.validate()?;
    Ok(cfg)
}
