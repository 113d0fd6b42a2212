//! The batching, concurrency-bounded event sink.
//!
//! `new` wires a handle/engine pair around a bounded ingestion channel:
//! the `EventSink` handle implements the upstream `EventHandler` contract
//! and normalizes notifications into entries; the `DispatchEngine` owns the
//! buffer, the flush timer and the concurrency gate, and ships sealed
//! batches through the configured writer.

pub mod buffer;
pub mod config;
pub mod engine;
pub mod gate;
pub mod metrics;

pub use buffer::{Batch, EntryBuffer, FlushReason};
pub use config::{SinkConfig, SinkConfigError};
pub use engine::DispatchEngine;
pub use gate::{ConcurrencyGate, GatePermit};
pub use metrics::SinkMetrics;

use crate::domain::{ClusterEvent, LogEntry};
use crate::normalize::EntryFactory;
use crate::writer::LogWriter;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Synthetic entry emitted once per engine lifetime, on the first full
/// list/sync notification.
const STARTUP_MESSAGE: &str =
    "Started watching cluster events. Events before this point may have been lost.";

/// Upstream notification contract. The watcher delivers at least once and
/// the sink does not deduplicate.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_add(&self, event: &ClusterEvent);

    /// `old` is the previous version of the event when the watcher has one;
    /// used only for the count-regression warning.
    async fn on_update(&self, old: Option<&ClusterEvent>, event: &ClusterEvent);

    async fn on_delete(&self, event: &ClusterEvent);

    /// Full list/sync notification. Only lifecycle significance: the first
    /// one triggers the startup message.
    async fn on_list(&self);
}

/// Cloneable producer side of the sink: normalizes notifications and feeds
/// the engine's ingestion channel. Sends suspend while the channel is full,
/// which is the system's upstream backpressure point.
#[derive(Clone)]
pub struct EventSink {
    entry_tx: mpsc::Sender<LogEntry>,
    factory: EntryFactory,
    metrics: SinkMetrics,
    before_first_list: Arc<AtomicBool>,
}

impl EventSink {
    async fn submit_event(&self, event: &ClusterEvent) {
        self.metrics.observe_received(&event.source.component);
        self.submit(self.factory.from_event(event)).await;
    }

    async fn submit(&self, entry: LogEntry) {
        if self.entry_tx.send(entry).await.is_err() {
            debug!("Dispatch engine stopped, dropping entry");
        }
    }
}

#[async_trait]
impl EventHandler for EventSink {
    async fn on_add(&self, event: &ClusterEvent) {
        self.submit_event(event).await;
    }

    async fn on_update(&self, old: Option<&ClusterEvent>, event: &ClusterEvent) {
        if let Some(old) = old {
            if event.count != old.count + 1 {
                warn!(
                    reason = %event.reason,
                    resource = %event.involved_object.name,
                    old_count = old.count,
                    new_count = event.count,
                    "Event count did not increase by one between sync cycles"
                );
            }
        }
        self.submit_event(event).await;
    }

    async fn on_delete(&self, _event: &ClusterEvent) {
        // Deletions carry no delivery obligation.
    }

    async fn on_list(&self) {
        if self.before_first_list.swap(false, Ordering::SeqCst) {
            self.submit(self.factory.from_message(STARTUP_MESSAGE)).await;
        }
    }
}

/// Build a connected handle/engine pair. Fails fast on unusable tuning
/// values; nothing is spawned here — the caller runs the engine.
pub fn new(
    config: SinkConfig,
    factory: EntryFactory,
    writer: Arc<dyn LogWriter>,
    metrics: SinkMetrics,
    stop: CancellationToken,
) -> Result<(EventSink, DispatchEngine), SinkConfigError> {
    config.validate()?;

    // Ingestion capacity tracks the batch bound: at most one unflushed
    // batch's worth of entries queues up behind a stalled control loop.
    let (entry_tx, entry_rx) = mpsc::channel(config.max_buffer_size);

    let handle = EventSink {
        entry_tx,
        factory,
        metrics: metrics.clone(),
        before_first_list: Arc::new(AtomicBool::new(true)),
    };
    let engine = DispatchEngine::new(entry_rx, config, writer, metrics, stop);

    Ok((handle, engine))
}
