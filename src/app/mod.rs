//! Process wiring: configuration, logging, signal handling, and the run
//! loop tying source, sink, and writer together.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod shutdown;

pub use config::{Config, ConfigError, LogLevel};
pub use logging::init_logging;

use anyhow::Context;
use prometheus::Registry;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::normalize::EntryFactory;
use crate::sink::{self, SinkMetrics};
use crate::source::NdjsonSource;
use crate::writer::create_writer;

/// Runs the sink end to end: decode watch notifications from stdin, batch
/// them, and dispatch to the configured backend. Returns once the input
/// stream ends or a termination signal arrives and buffered work has
/// drained.
pub async fn run(config: Config) -> anyhow::Result<()> {
    init_logging(config.log_level).context("failed to initialize logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = %config.sink_provider,
        log_name = %config.log_name,
        flush_delay_ms = config.flush_delay_ms,
        max_buffer_size = config.max_buffer_size,
        max_concurrency = config.max_concurrency,
        "Starting kube-event-sink"
    );

    let registry = Registry::new();
    let sink_metrics = SinkMetrics::new(&registry).context("failed to register sink counters")?;

    let writer = create_writer(
        config.sink_provider,
        &config.endpoint,
        &config.audit_log_path,
        sink_metrics.clone(),
    )
    .await
    .context("failed to initialize writer backend")?;

    let stop = CancellationToken::new();
    shutdown::spawn_signal_listener(stop.clone());
    tokio::spawn(metrics::serve_metrics(
        registry,
        config.metrics_addr,
        stop.clone(),
    ));

    let factory = EntryFactory::new(&config.source_name);
    let sink_config = config.sink_config().context("invalid sink configuration")?;
    let (handle, engine) = sink::new(sink_config, factory, writer, sink_metrics, stop.clone())
        .context("failed to build dispatch engine")?;
    let engine_task = tokio::spawn(engine.run());

    let source = NdjsonSource::new(BufReader::new(tokio::io::stdin()), stop.clone());
    if let Err(e) = source.run(&handle).await {
        error!("Notification stream failed: {e}");
    }

    // Closing the handle lets the engine drain already-submitted entries
    // before its final flush; on a signal the engine exits directly.
    drop(handle);
    engine_task.await.context("dispatch engine task panicked")?;
    stop.cancel();

    info!("kube-event-sink stopped");
    Ok(())
}
