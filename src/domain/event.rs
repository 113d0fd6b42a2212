use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity class of a cluster event, mirroring the upstream watcher's
/// Normal/Warning split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[default]
    Normal,
    Warning,
}

/// Reference to the object an event is about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Component that reported the event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSource {
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// A cluster event as delivered by the upstream watcher.
///
/// `count`, `first_seen` and `last_seen` are recurrence bookkeeping the
/// watcher rewrites on every sync cycle; the normalizer strips them from the
/// serialized payload so recurrences of one event compare equal downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterEvent {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub kind: EventKind,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub involved_object: ObjectRef,
    #[serde(default)]
    pub source: EventSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}
