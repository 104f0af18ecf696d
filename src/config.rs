use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::tracking::StoreError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    Invalid { key: &'static str, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Which [`SampleStore`](crate::tracking::SampleStore) backend to run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis { url: String, key_prefix: String },
}

/// Runtime settings, read from the environment with local-dev defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub store: StoreBackend,
    /// 0 disables demo seeding
    pub seed_students: usize,
    pub stats_stream_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            store: StoreBackend::Memory,
            seed_students: 40,
            stats_stream_interval: Duration::from_millis(1000),
        }
    }
}

impl AppConfig {
    /// Reads settings from the process environment:
    ///
    ///   BIND_ADDR                 listen address
    ///   SAMPLE_STORE              `memory` | `redis`
    ///   REDIS_URL                 used with SAMPLE_STORE=redis
    ///   REDIS_KEY_PREFIX          namespace for the sample keys
    ///   SEED_STUDENTS             demo students to create at startup
    ///   STATS_STREAM_INTERVAL_MS  SSE snapshot period
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let store = match lookup("SAMPLE_STORE").as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("redis") => StoreBackend::Redis {
                url: lookup("REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1:6379/".to_string()),
                key_prefix: lookup("REDIS_KEY_PREFIX").unwrap_or_else(|| "exec_time".to_string()),
            },
            Some(other) => return Err(StoreError::InvalidBackend(other.to_string()).into()),
        };

        let interval_ms: u64 = parse_or(&lookup, "STATS_STREAM_INTERVAL_MS", 1000)?;
        if interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "STATS_STREAM_INTERVAL_MS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            store,
            seed_students: parse_or(&lookup, "SEED_STUDENTS", defaults.seed_students)?,
            stats_stream_interval: Duration::from_millis(interval_ms),
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
