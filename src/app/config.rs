use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::domain::ResourceDescriptor;
use crate::sink::SinkConfig;
use crate::writer::SinkProvider;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid resource label '{0}': expected key=value")]
    InvalidLabel(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Delivery backend for flushed batches
    #[arg(long, env = "SINK_PROVIDER", default_value = "http")]
    pub sink_provider: SinkProvider,

    /// Collector endpoint URL (http provider)
    #[arg(
        long,
        env = "SINK_ENDPOINT",
        default_value = "http://localhost:9600/write"
    )]
    pub endpoint: String,

    /// Audit log file path (file provider)
    #[arg(
        long,
        env = "AUDIT_LOG_PATH",
        default_value = "/var/log/kube-event-sink/events.log"
    )]
    pub audit_log_path: PathBuf,

    /// Destination log name attached to every write
    #[arg(long, env = "SINK_LOG_NAME", default_value = "events")]
    pub log_name: String,

    /// Kind of the monitored resource reported to the backend
    #[arg(long, env = "SINK_RESOURCE_KIND", default_value = "k8s_cluster")]
    pub resource_kind: String,

    /// Resource label as key=value (repeatable)
    #[arg(long = "resource-label", value_name = "KEY=VALUE")]
    pub resource_labels: Vec<String>,

    /// Quiet period after the first buffered entry before a timer flush
    #[arg(long, env = "SINK_FLUSH_DELAY_MS", default_value = "5000")]
    pub flush_delay_ms: u64,

    /// Number of buffered entries that forces an immediate flush
    #[arg(long, env = "SINK_MAX_BUFFER_SIZE", default_value = "100")]
    pub max_buffer_size: usize,

    /// Maximum number of in-flight write requests
    #[arg(long, env = "SINK_MAX_CONCURRENCY", default_value = "10")]
    pub max_concurrency: usize,

    /// Component name stamped on lifecycle messages
    #[arg(long, env = "SOURCE_NAME", default_value = "kube-event-sink")]
    pub source_name: String,

    /// Bind address for the metrics and health endpoints
    #[arg(long, env = "METRICS_ADDR", default_value = "127.0.0.1:9102")]
    pub metrics_addr: SocketAddr,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        // Must stay in sync with the clap defaults above.
        Self {
            sink_provider: SinkProvider::Http,
            endpoint: "http://localhost:9600/write".to_string(),
            audit_log_path: PathBuf::from("/var/log/kube-event-sink/events.log"),
            log_name: "events".to_string(),
            resource_kind: "k8s_cluster".to_string(),
            resource_labels: Vec::new(),
            flush_delay_ms: 5000,
            max_buffer_size: 100,
            max_concurrency: 10,
            source_name: "kube-event-sink".to_string(),
            metrics_addr: SocketAddr::from(([127, 0, 0, 1], 9102)),
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Config::parse_from(args);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sink_provider == SinkProvider::Http {
            Url::parse(&self.endpoint).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid endpoint URL '{}': {e}", self.endpoint))
            })?;
        }

        if self.flush_delay_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "Flush delay must be greater than 0".to_string(),
            ));
        }

        if self.max_buffer_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "Max buffer size must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConfig(
                "Max concurrency must be greater than 0".to_string(),
            ));
        }

        if self.log_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Log name must not be empty".to_string(),
            ));
        }

        for raw in &self.resource_labels {
            parse_label(raw)?;
        }

        Ok(())
    }

    pub fn flush_delay(&self) -> Duration {
        Duration::from_millis(self.flush_delay_ms)
    }

    pub fn resource_descriptor(&self) -> Result<ResourceDescriptor, ConfigError> {
        let mut resource = ResourceDescriptor::new(&self.resource_kind);
        for raw in &self.resource_labels {
            let (key, value) = parse_label(raw)?;
            resource = resource.with_label(key, value);
        }
        Ok(resource)
    }

    pub fn sink_config(&self) -> Result<SinkConfig, ConfigError> {
        Ok(SinkConfig {
            flush_delay: self.flush_delay(),
            max_buffer_size: self.max_buffer_size,
            max_concurrency: self.max_concurrency,
            log_name: self.log_name.clone(),
            resource: self.resource_descriptor()?,
        })
    }
}

fn parse_label(raw: &str) -> Result<(&str, &str), ConfigError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(ConfigError::InvalidLabel(raw.to_string())),
    }
}
