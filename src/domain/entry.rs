use serde::{Deserialize, Serialize};

/// Delivery outcome recorded on a normalized entry.
///
/// Warning-class events map to `Failure`, everything else observed from the
/// cluster maps to `Success`; `Info` is reserved for synthetic lifecycle
/// entries emitted by the sink itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Success,
    Failure,
    Info,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::Failure => "FAILURE",
            Outcome::Info => "INFO",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized log record ready for batching and delivery.
///
/// Produced once per observed cluster event (or lifecycle message) by the
/// normalizer and never mutated afterwards; ownership passes to the batch
/// that carries it until the writer call completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Structured body, already serialized. Preferred over `text_payload`
    /// when both are present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_payload: Option<String>,
    pub outcome: Outcome,
    /// RFC3339 with nanosecond precision.
    pub timestamp: String,
    pub reason: String,
    pub resource_id: String,
    pub resource_type: String,
    pub source_component: String,
}

impl LogEntry {
    /// The body to deliver: the JSON payload when non-empty, else the text
    /// payload.
    pub fn payload(&self) -> Option<&str> {
        match self.json_payload.as_deref() {
            Some(json) if !json.is_empty() => Some(json),
            _ => self.text_payload.as_deref().filter(|t| !t.is_empty()),
        }
    }
}
