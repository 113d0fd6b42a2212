//! Delivery backends behind a single polymorphic capability.
//!
//! The dispatch engine is written against `LogWriter` and never branches on
//! backend identity; `create_writer` picks the backend once at startup.

pub mod file;
pub mod http;

pub use file::FileWriter;
pub use http::HttpWriter;

use crate::domain::{LogEntry, ResourceDescriptor};
use crate::sink::SinkMetrics;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Invalid endpoint URL '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        source: url::ParseError,
    },
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("Failed to open audit log '{path}': {source}")]
    AuditFile {
        path: String,
        source: std::io::Error,
    },
}

/// Configured backend choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SinkProvider {
    /// POST batches as JSON to a remote collector.
    Http,
    /// Append entries as JSON lines to a local audit log file.
    File,
}

impl std::fmt::Display for SinkProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkProvider::Http => f.write_str("http"),
            SinkProvider::File => f.write_str("file"),
        }
    }
}

/// Accepts finite batches of entries plus delivery metadata and owns the
/// actual I/O. Shared read-only across concurrently running dispatch tasks.
#[async_trait]
pub trait LogWriter: Send + Sync {
    /// Deliver one batch. Returns how many entries the backend accepted;
    /// delivery failure surfaces only as a count smaller than
    /// `entries.len()`. Never retried by the caller.
    async fn write(
        &self,
        entries: &[LogEntry],
        log_name: &str,
        resource: &ResourceDescriptor,
    ) -> usize;

    /// Backend identity, for wiring and logs only; dispatch logic never
    /// consults it.
    fn kind(&self) -> &'static str;
}

/// Select and construct the configured backend. The one place backend
/// identity is examined.
pub async fn create_writer(
    provider: SinkProvider,
    endpoint: &str,
    audit_log_path: &Path,
    metrics: SinkMetrics,
) -> Result<Arc<dyn LogWriter>, WriterError> {
    let writer: Arc<dyn LogWriter> = match provider {
        SinkProvider::Http => Arc::new(HttpWriter::new(endpoint, metrics)?),
        SinkProvider::File => Arc::new(FileWriter::open(audit_log_path, metrics).await?),
    };
    info!(writer = writer.kind(), "Writer backend ready");
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn factory_selects_http_backend() {
        let writer = create_writer(
            SinkProvider::Http,
            "http://localhost:9600/write",
            Path::new("/unused"),
            SinkMetrics::unregistered(),
        )
        .await
        .unwrap();
        assert_eq!(writer.kind(), "http");
    }

    #[tokio::test]
    async fn factory_selects_file_backend() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.log");
        let writer = create_writer(
            SinkProvider::File,
            "http://unused",
            &path,
            SinkMetrics::unregistered(),
        )
        .await
        .unwrap();
        assert_eq!(writer.kind(), "file");
    }

    #[tokio::test]
    async fn factory_rejects_malformed_endpoint() {
        let result = create_writer(
            SinkProvider::Http,
            "not a url",
            Path::new("/unused"),
            SinkMetrics::unregistered(),
        )
        .await;
        assert!(matches!(result, Err(WriterError::InvalidEndpoint { .. })));
    }
}
