//! Domain layer for kube-event-sink.
//!
//! Contains the canonical types shared across all modules:
//! - `ClusterEvent`: the upstream record as observed by the watcher
//! - `LogEntry` / `Outcome`: the normalized record the sink delivers
//! - `ResourceDescriptor`: opaque delivery metadata threaded to the writer

pub mod entry;
pub mod event;
pub mod resource;

pub use entry::{LogEntry, Outcome};
pub use event::{ClusterEvent, EventKind, EventSource, ObjectRef};
pub use resource::ResourceDescriptor;
