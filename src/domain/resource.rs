use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Backend-addressing metadata describing where delivered entries originate.
///
/// Opaque to the dispatch engine: it is threaded through to the writer
/// unchanged, exactly as configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub kind: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl ResourceDescriptor {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}
