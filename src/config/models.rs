// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::invoker::Endpoint;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("At least one backend must be configured")]
    NoBackends,

    #[error("Backend {url} has non-positive weight {weight}")]
    InvalidWeight { url: Url, weight: i64 },

    #[error("Backend {url} has failure rate {rate} outside [0, 1]")]
    InvalidFailureRate { url: Url, rate: f64 },

    #[error("Backend {0} is configured more than once")]
    DuplicateBackend(String),

    #[error("Simulation needs at least one worker")]
    NoWorkers,

    #[error("Retry max_attempts must be at least 1")]
    NoRetryAttempts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backends: Vec<BackendConfig>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }

        let mut seen = HashSet::new();
        for backend in &self.backends {
            if backend.weight <= 0 {
                return Err(ConfigError::InvalidWeight {
                    url: backend.url.clone(),
                    weight: backend.weight,
                });
            }
            if !(0.0..=1.0).contains(&backend.failure_rate) {
                return Err(ConfigError::InvalidFailureRate {
                    url: backend.url.clone(),
                    rate: backend.failure_rate,
                });
            }

            let id = Endpoint::new(backend.url.clone()).id;
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateBackend(id));
            }
        }

        if self.simulation.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::NoRetryAttempts);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: Url,
    pub weight: i64,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub failure_rate: f64,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Log a weight snapshot every N dispatches; 0 disables it.
    #[serde(default)]
    pub report_every: u64,
}

fn default_iterations() -> u64 {
    10_000
}

fn default_workers() -> usize {
    1
}

fn default_seed() -> u64 {
    42
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            workers: default_workers(),
            seed: default_seed(),
            report_every: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1
}

fn default_backoff_max_ms() -> u64 {
    20
}

impl RetryConfig {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
}
