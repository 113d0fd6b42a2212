//! Conversion of watcher records into normalized log entries.

use crate::domain::{ClusterEvent, EventKind, LogEntry, Outcome};
use chrono::{SecondsFormat, Utc};
use tracing::warn;

/// Fields stripped from the serialized event payload. They are recurrence
/// bookkeeping rewritten on every sync cycle; dropping them keeps repeated
/// occurrences of one event byte-identical downstream.
const PAYLOAD_FIELD_BLACKLIST: &[&str] = &["count", "first_seen", "last_seen"];

const INFO_REASON: &str = "INFO";

/// Builds `LogEntry` values from cluster events and lifecycle messages.
#[derive(Debug, Clone)]
pub struct EntryFactory {
    service_name: String,
}

impl EntryFactory {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Normalize an observed cluster event.
    pub fn from_event(&self, event: &ClusterEvent) -> LogEntry {
        let timestamp = event
            .last_seen
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Nanos, true);

        LogEntry {
            json_payload: self.serialize_event(event),
            text_payload: None,
            outcome: parse_outcome(event),
            timestamp,
            reason: event.reason.clone(),
            resource_id: event.involved_object.name.clone(),
            resource_type: event.involved_object.kind.clone(),
            source_component: event.source.component.clone(),
        }
    }

    /// Build a synthetic lifecycle entry (e.g. the startup message), carrying
    /// this process rather than a cluster object as its resource.
    pub fn from_message(&self, msg: &str) -> LogEntry {
        let host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_default();

        LogEntry {
            json_payload: None,
            text_payload: Some(msg.to_string()),
            outcome: Outcome::Info,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
            reason: INFO_REASON.to_string(),
            resource_id: host,
            resource_type: self.service_name.clone(),
            source_component: self.service_name.clone(),
        }
    }

    fn serialize_event(&self, event: &ClusterEvent) -> Option<String> {
        let value = match serde_json::to_value(event) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to encode event {:?}: {e}", event.reason);
                return None;
            }
        };

        let mut obj = match value {
            serde_json::Value::Object(obj) => obj,
            other => return Some(other.to_string()),
        };

        for field in PAYLOAD_FIELD_BLACKLIST {
            obj.remove(*field);
        }

        Some(serde_json::Value::Object(obj).to_string())
    }
}

fn parse_outcome(event: &ClusterEvent) -> Outcome {
    if event.kind == EventKind::Warning {
        Outcome::Failure
    } else {
        Outcome::Success
    }
}
