use prometheus::{Encoder, Registry, TextEncoder};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use warp::{Filter, Reply};

fn render_metrics(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;

    Ok(String::from_utf8_lossy(&buffer).to_string())
}

/// Serves `GET /metrics` (Prometheus text format) and `GET /healthz` until
/// `stop` is cancelled. A failure to bind is logged, not fatal: the sink
/// keeps running without the exporter.
pub async fn serve_metrics(registry: Registry, addr: SocketAddr, stop: CancellationToken) {
    let metrics = warp::path!("metrics")
        .and(warp::get())
        .map(move || match render_metrics(&registry) {
            Ok(text) => {
                warp::reply::with_header(text, "content-type", "text/plain; version=0.0.4")
                    .into_response()
            }
            Err(e) => {
                warn!("Failed to encode metrics: {e}");
                warp::reply::with_status(
                    "Internal Server Error",
                    warp::http::StatusCode::INTERNAL_SERVER_ERROR,
                )
                .into_response()
            }
        });

    let health = warp::path!("healthz").and(warp::get()).map(|| "OK");

    let routes = metrics.or(health);

    let shutdown = async move { stop.cancelled().await };
    match warp::serve(routes).try_bind_with_graceful_shutdown(addr, shutdown) {
        Ok((bound, server)) => {
            info!(addr = %bound, "Serving Prometheus metrics");
            server.await;
        }
        Err(e) => warn!("Failed to bind metrics listener on {addr}: {e}"),
    }
}
