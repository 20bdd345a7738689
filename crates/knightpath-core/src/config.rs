//! PipelineConfig - キューとワーカーループの実行時設定
//!
//! 既定値に `KNIGHTPATH_*` 環境変数で上書きをかけます。
//! 値の検証は `validate()`（AppBuilder::build() からも呼ばれる）で行います。

use std::time::Duration;

use thiserror::Error;

pub const ENV_QUEUE_WAIT_MS: &str = "KNIGHTPATH_QUEUE_WAIT_MS";
pub const ENV_VISIBILITY_TIMEOUT_MS: &str = "KNIGHTPATH_VISIBILITY_TIMEOUT_MS";
pub const ENV_WORKER_CONCURRENCY: &str = "KNIGHTPATH_WORKER_CONCURRENCY";
pub const ENV_BATCH_SIZE: &str = "KNIGHTPATH_BATCH_SIZE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be an unsigned integer, got {value:?}")]
    NotANumber { key: &'static str, value: String },

    #[error("{key} must be at least 1")]
    Zero { key: &'static str },
}

/// Runtime settings for the queue and worker loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// How long a single `pop` waits for a message.
    pub queue_wait: Duration,
    /// How long a received message stays invisible before it is redelivered.
    pub visibility_timeout: Duration,
    /// Number of deliveries processed concurrently by the worker loop.
    pub worker_concurrency: usize,
    /// Maximum deliveries pulled per loop iteration.
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_wait: Duration::from_millis(1_000),
            visibility_timeout: Duration::from_millis(30_000),
            worker_concurrency: 1,
            batch_size: 10,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `KNIGHTPATH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = read_u64(&lookup, ENV_QUEUE_WAIT_MS)? {
            config.queue_wait = Duration::from_millis(ms);
        }
        if let Some(ms) = read_u64(&lookup, ENV_VISIBILITY_TIMEOUT_MS)? {
            config.visibility_timeout = Duration::from_millis(ms);
        }
        if let Some(n) = read_u64(&lookup, ENV_WORKER_CONCURRENCY)? {
            config.worker_concurrency = n as usize;
        }
        if let Some(n) = read_u64(&lookup, ENV_BATCH_SIZE)? {
            config.batch_size = n as usize;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_concurrency == 0 {
            return Err(ConfigError::Zero {
                key: ENV_WORKER_CONCURRENCY,
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Zero {
                key: ENV_BATCH_SIZE,
            });
        }
        Ok(())
    }
}

fn read_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::NotANumber { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn env_overrides_defaults() {
        let config = PipelineConfig::from_lookup(lookup(&[
            (ENV_QUEUE_WAIT_MS, "250"),
            (ENV_VISIBILITY_TIMEOUT_MS, "5000"),
            (ENV_WORKER_CONCURRENCY, "4"),
            (ENV_BATCH_SIZE, " 3 "),
        ]))
        .unwrap();

        assert_eq!(config.queue_wait, Duration::from_millis(250));
        assert_eq!(config.visibility_timeout, Duration::from_secs(5));
        assert_eq!(config.worker_concurrency, 4);
        assert_eq!(config.batch_size, 3);
    }

    #[test]
    fn rejects_garbage_and_zero() {
        let err = PipelineConfig::from_lookup(lookup(&[(ENV_QUEUE_WAIT_MS, "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotANumber {
                key: ENV_QUEUE_WAIT_MS,
                value: "soon".to_string()
            }
        );

        let err = PipelineConfig::from_lookup(lookup(&[(ENV_WORKER_CONCURRENCY, "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Zero {
                key: ENV_WORKER_CONCURRENCY
            }
        );
    }
}
