use super::buffer::{EntryBuffer, FlushReason};
use super::config::SinkConfig;
use super::gate::ConcurrencyGate;
use super::metrics::SinkMetrics;
use crate::domain::LogEntry;
use crate::writer::LogWriter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The sink's control loop: accumulates entries, flushes on size or timer,
/// and hands sealed batches to gate-bounded dispatch tasks.
///
/// All buffer and timer state is owned by this single task; the only shared
/// touchpoints with dispatch tasks are the gate and the counters. Runs until
/// the stop token fires or every handle is dropped, then flushes what is
/// buffered and drains the gate so no write is abandoned mid-flight.
pub struct DispatchEngine {
    entry_rx: mpsc::Receiver<LogEntry>,
    buffer: EntryBuffer,
    gate: ConcurrencyGate,
    writer: Arc<dyn LogWriter>,
    config: SinkConfig,
    metrics: SinkMetrics,
    stop: CancellationToken,
}

impl DispatchEngine {
    pub(super) fn new(
        entry_rx: mpsc::Receiver<LogEntry>,
        config: SinkConfig,
        writer: Arc<dyn LogWriter>,
        metrics: SinkMetrics,
        stop: CancellationToken,
    ) -> Self {
        Self {
            entry_rx,
            buffer: EntryBuffer::new(config.max_buffer_size),
            gate: ConcurrencyGate::new(config.max_concurrency),
            writer,
            config,
            metrics,
            stop,
        }
    }

    pub async fn run(mut self) {
        info!(
            flush_delay_ms = self.config.flush_delay.as_millis() as u64,
            max_buffer_size = self.config.max_buffer_size,
            max_concurrency = self.config.max_concurrency,
            writer = self.writer.kind(),
            "Dispatch engine started"
        );

        // Single re-armable flush timer. The guard keeps the branch disabled
        // while the buffer is empty, so the stale deadline never fires.
        let flush_timer = tokio::time::sleep(Duration::ZERO);
        tokio::pin!(flush_timer);
        let mut timer_armed = false;

        loop {
            tokio::select! {
                entry = self.entry_rx.recv() => {
                    match entry {
                        Some(entry) => {
                            self.buffer.append(entry);
                            if self.buffer.is_full() {
                                timer_armed = false;
                                self.flush(FlushReason::Size).await;
                            } else if self.buffer.len() == 1 {
                                flush_timer
                                    .as_mut()
                                    .reset(Instant::now() + self.config.flush_delay);
                                timer_armed = true;
                            }
                        }
                        None => {
                            debug!("All sink handles dropped, stopping");
                            break;
                        }
                    }
                }
                () = &mut flush_timer, if timer_armed => {
                    timer_armed = false;
                    self.flush(FlushReason::Timer).await;
                }
                () = self.stop.cancelled() => {
                    debug!("Stop signal observed");
                    break;
                }
            }
        }

        self.shutdown().await;
    }

    /// Seal the buffer and hand the batch to a dispatch task. Waits for a
    /// gate slot first, which stalls the control loop when `max_concurrency`
    /// batches are already in flight; that stall is the system's only
    /// internal backpressure.
    async fn flush(&mut self, reason: FlushReason) {
        let batch = self.buffer.seal(reason);
        if batch.is_empty() {
            // A fire racing a just-completed flush; nothing to send.
            return;
        }

        let permit = self.gate.acquire().await;
        debug!(
            batch_id = batch.id(),
            size = batch.len(),
            reason = reason.as_str(),
            "Dispatching batch"
        );

        let writer = Arc::clone(&self.writer);
        let metrics = self.metrics.clone();
        let log_name = self.config.log_name.clone();
        let resource = self.config.resource.clone();
        tokio::spawn(async move {
            let accepted = writer
                .write(batch.entries(), &log_name, &resource)
                .await;
            if accepted < batch.len() {
                warn!(
                    batch_id = batch.id(),
                    accepted,
                    size = batch.len(),
                    "Writer accepted fewer entries than dispatched"
                );
            }
            metrics.observe_accepted(accepted);
            drop(permit);
        });
    }

    /// Flush whatever is still buffered, then take every gate slot. The
    /// drain completes only once all dispatch tasks have released theirs,
    /// so returning from here proves no write is in flight.
    async fn shutdown(&mut self) {
        if !self.buffer.is_empty() {
            info!(
                pending = self.buffer.len(),
                "Flushing buffered entries before drain"
            );
            self.flush(FlushReason::Shutdown).await;
        }
        self.gate.drain().await;
        info!("Dispatch engine stopped");
    }
}
