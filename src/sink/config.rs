use crate::domain::ResourceDescriptor;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_FLUSH_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 100;
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SinkConfigError {
    #[error("Flush delay must be greater than zero")]
    ZeroFlushDelay,
    #[error("Max buffer size must be at least 1")]
    ZeroBufferSize,
    #[error("Max concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("Log name must not be empty")]
    EmptyLogName,
}

/// Tuning and addressing for one sink instance.
///
/// The three numeric knobs are the entire tuning surface of the dispatch
/// engine; `log_name` and `resource` are opaque delivery metadata handed to
/// the writer unchanged.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Time since the first entry in an otherwise-empty buffer before an
    /// automatic flush.
    pub flush_delay: Duration,
    /// Entry count that forces an immediate flush.
    pub max_buffer_size: usize,
    /// Maximum simultaneous in-flight writer calls.
    pub max_concurrency: usize,
    pub log_name: String,
    pub resource: ResourceDescriptor,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            flush_delay: DEFAULT_FLUSH_DELAY,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            log_name: "events".to_string(),
            resource: ResourceDescriptor::new("k8s_cluster"),
        }
    }
}

impl SinkConfig {
    /// Rejects unusable tuning values. Called before the engine is
    /// constructed; the process must not start with a config that fails here.
    pub fn validate(&self) -> Result<(), SinkConfigError> {
        if self.flush_delay.is_zero() {
            return Err(SinkConfigError::ZeroFlushDelay);
        }
        if self.max_buffer_size == 0 {
            return Err(SinkConfigError::ZeroBufferSize);
        }
        if self.max_concurrency == 0 {
            return Err(SinkConfigError::ZeroConcurrency);
        }
        if self.log_name.is_empty() {
            return Err(SinkConfigError::EmptyLogName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SinkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.flush_delay, Duration::from_secs(5));
        assert_eq!(config.max_buffer_size, 100);
        assert_eq!(config.max_concurrency, 10);
    }

    #[test]
    fn rejects_zero_tuning_values() {
        let config = SinkConfig {
            flush_delay: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(SinkConfigError::ZeroFlushDelay));

        let config = SinkConfig {
            max_buffer_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(SinkConfigError::ZeroBufferSize));

        let config = SinkConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(SinkConfigError::ZeroConcurrency));
    }

    #[test]
    fn rejects_empty_log_name() {
        let config = SinkConfig {
            log_name: String::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(SinkConfigError::EmptyLogName));
    }
}
