use crate::domain::LogEntry;
use uuid::Uuid;

/// What sealed a batch. Carried for log correlation only; the writer never
/// sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    Size,
    Timer,
    Shutdown,
}

impl FlushReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushReason::Size => "size",
            FlushReason::Timer => "timer",
            FlushReason::Shutdown => "shutdown",
        }
    }
}

/// A sealed, ordered group of entries delivered to the writer in one call.
///
/// Owned exclusively by the dispatch task sending it; never mutated after
/// sealing.
#[derive(Debug, Clone)]
pub struct Batch {
    id: String,
    entries: Vec<LogEntry>,
    reason: FlushReason,
}

impl Batch {
    fn new(entries: Vec<LogEntry>, reason: FlushReason) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entries,
            reason,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    pub fn reason(&self) -> FlushReason {
        self.reason
    }
}

/// Accumulates entries in arrival order until the engine seals them.
///
/// Owned and mutated exclusively by the engine's control loop, so it needs
/// no locking; nothing else ever touches it.
#[derive(Debug)]
pub struct EntryBuffer {
    entries: Vec<LogEntry>,
    max_size: usize,
}

impl EntryBuffer {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_size),
            max_size,
        }
    }

    /// Append one entry to the tail. The engine checks `len`/`is_full`
    /// afterwards to sequence the size-flush and timer-arm decisions.
    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max_size
    }

    /// Hand off the current contents as a sealed batch and start a fresh
    /// one. Safe on an empty buffer; the caller must skip dispatch when the
    /// returned batch is empty.
    pub fn seal(&mut self, reason: FlushReason) -> Batch {
        let entries = std::mem::replace(&mut self.entries, Vec::with_capacity(self.max_size));
        Batch::new(entries, reason)
    }
}
