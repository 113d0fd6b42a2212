use super::{LogWriter, WriterError};
use crate::domain::{LogEntry, ResourceDescriptor};
use crate::sink::SinkMetrics;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One writer call on the wire: the batch plus its delivery metadata,
/// serialized as a single JSON document.
#[derive(Serialize)]
struct WriteRequest<'a> {
    log_name: &'a str,
    resource: &'a ResourceDescriptor,
    entries: &'a [LogEntry],
}

/// Ships batches to a remote collector with one POST per batch.
pub struct HttpWriter {
    client: Client,
    endpoint: Url,
    metrics: SinkMetrics,
}

impl HttpWriter {
    pub fn new(endpoint: &str, metrics: SinkMetrics) -> Result<Self, WriterError> {
        let endpoint = Url::parse(endpoint).map_err(|source| WriterError::InvalidEndpoint {
            url: endpoint.to_string(),
            source,
        })?;

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint,
            metrics,
        })
    }
}

#[async_trait]
impl LogWriter for HttpWriter {
    async fn write(
        &self,
        entries: &[LogEntry],
        log_name: &str,
        resource: &ResourceDescriptor,
    ) -> usize {
        let request = WriteRequest {
            log_name,
            resource,
            entries,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status();
                self.metrics.observe_request(status.as_str());
                if status.is_success() {
                    entries.len()
                } else {
                    warn!(%status, size = entries.len(), "Collector rejected batch");
                    0
                }
            }
            Err(e) => {
                self.metrics.observe_request("error");
                warn!(size = entries.len(), "Failed to reach collector: {e}");
                0
            }
        }
    }

    fn kind(&self) -> &'static str {
        "http"
    }
}
