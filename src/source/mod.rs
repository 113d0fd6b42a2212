//! Watch notification intake.
//!
//! Reads newline-delimited JSON notifications from an async byte stream and
//! replays them onto an [`EventHandler`]. One line is one notification; a
//! malformed line is logged and skipped so a single bad record cannot stall
//! the feed.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::ClusterEvent;
use crate::sink::EventHandler;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read from notification stream: {0}")]
    Read(#[from] std::io::Error),
}

/// One record on the watch feed.
///
/// The `kind` tag mirrors the lifecycle callbacks of [`EventHandler`]:
/// `added`, `updated` and `deleted` carry cluster events, `synced` marks the
/// completion of an initial listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WatchNotification {
    Added {
        event: ClusterEvent,
    },
    Updated {
        #[serde(default)]
        old: Option<ClusterEvent>,
        event: ClusterEvent,
    },
    Deleted {
        event: ClusterEvent,
    },
    Synced,
}

/// Drives an [`EventHandler`] from a newline-delimited JSON stream.
pub struct NdjsonSource<R> {
    reader: R,
    stop: CancellationToken,
}

impl<R: AsyncBufRead + Unpin> NdjsonSource<R> {
    pub fn new(reader: R, stop: CancellationToken) -> Self {
        Self { reader, stop }
    }

    /// Consumes the stream until end of input or cancellation, dispatching
    /// each decoded notification in order.
    pub async fn run<H>(self, handler: &H) -> Result<(), SourceError>
    where
        H: EventHandler + ?Sized,
    {
        let Self { reader, stop } = self;
        let mut lines = reader.lines();
        let mut dispatched = 0u64;

        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        let record = line.trim();
                        if record.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<WatchNotification>(record) {
                            Ok(notification) => {
                                dispatch(handler, notification).await;
                                dispatched += 1;
                            }
                            Err(e) => {
                                warn!(error = %e, "Skipping malformed watch notification");
                            }
                        }
                    }
                    None => {
                        info!(dispatched, "Notification stream reached end of input");
                        break;
                    }
                },
                () = stop.cancelled() => {
                    info!(dispatched, "Notification stream stopped");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn dispatch<H>(handler: &H, notification: WatchNotification)
where
    H: EventHandler + ?Sized,
{
    match notification {
        WatchNotification::Added { event } => handler.on_add(&event).await,
        WatchNotification::Updated { old, event } => handler.on_update(old.as_ref(), &event).await,
        WatchNotification::Deleted { event } => handler.on_delete(&event).await,
        WatchNotification::Synced => handler.on_list().await,
    }
}
