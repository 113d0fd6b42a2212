use prometheus::{Counter, CounterVec, Registry};

/// Delivery counters exposed by the sink.
///
/// Injected at construction and shared by the handle, the engine and the
/// writer backends; the sink only ever increments them, never reads them
/// back for control flow.
#[derive(Clone)]
pub struct SinkMetrics {
    received_entries: CounterVec,
    write_requests: CounterVec,
    accepted_entries: Counter,
}

impl SinkMetrics {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let received_entries = CounterVec::new(
            prometheus::Opts::new(
                "events_received_total",
                "Number of entries received by the sink, by source component",
            ),
            &["component"],
        )?;
        registry.register(Box::new(received_entries.clone()))?;

        let write_requests = CounterVec::new(
            prometheus::Opts::new(
                "write_requests_total",
                "Number of writer requests issued, by result status",
            ),
            &["status"],
        )?;
        registry.register(Box::new(write_requests.clone()))?;

        let accepted_entries = Counter::new(
            "entries_accepted_total",
            "Number of entries accepted by the writer",
        )?;
        registry.register(Box::new(accepted_entries.clone()))?;

        Ok(Self {
            received_entries,
            write_requests,
            accepted_entries,
        })
    }

    /// Counters registered against a throwaway registry, for tests and
    /// wiring that does not scrape.
    pub fn unregistered() -> Self {
        // A fresh registry cannot collide.
        Self::new(&Registry::new()).expect("fresh registry rejected sink counters")
    }

    pub fn observe_received(&self, component: &str) {
        self.received_entries.with_label_values(&[component]).inc();
    }

    pub fn observe_request(&self, status: &str) {
        self.write_requests.with_label_values(&[status]).inc();
    }

    pub fn observe_accepted(&self, count: usize) {
        self.accepted_entries.inc_by(count as f64);
    }

    pub fn received_count(&self, component: &str) -> u64 {
        self.received_entries.with_label_values(&[component]).get() as u64
    }

    pub fn request_count(&self, status: &str) -> u64 {
        self.write_requests.with_label_values(&[status]).get() as u64
    }

    pub fn accepted_count(&self) -> u64 {
        self.accepted_entries.get() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_register_once_per_registry() {
        let registry = Registry::new();
        assert!(SinkMetrics::new(&registry).is_ok());
        // Second registration against the same registry collides.
        assert!(SinkMetrics::new(&registry).is_err());
    }

    #[test]
    fn increments_are_visible_per_label() {
        let metrics = SinkMetrics::unregistered();
        metrics.observe_received("kubelet");
        metrics.observe_received("kubelet");
        metrics.observe_received("scheduler");
        metrics.observe_request("200");
        metrics.observe_accepted(7);

        assert_eq!(metrics.received_count("kubelet"), 2);
        assert_eq!(metrics.received_count("scheduler"), 1);
        assert_eq!(metrics.request_count("200"), 1);
        assert_eq!(metrics.request_count("error"), 0);
        assert_eq!(metrics.accepted_count(), 7);
    }
}
