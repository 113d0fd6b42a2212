// Full pipeline: NDJSON watch feed in, normalized batches out.
use async_trait::async_trait;
use kube_event_sink::domain::{LogEntry, Outcome, ResourceDescriptor};
use kube_event_sink::normalize::EntryFactory;
use kube_event_sink::sink::{self, SinkConfig, SinkMetrics};
use kube_event_sink::source::NdjsonSource;
use kube_event_sink::writer::LogWriter;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct CollectingWriter {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LogWriter for CollectingWriter {
    async fn write(
        &self,
        entries: &[LogEntry],
        _log_name: &str,
        _resource: &ResourceDescriptor,
    ) -> usize {
        self.entries.lock().unwrap().extend_from_slice(entries);
        entries.len()
    }

    fn kind(&self) -> &'static str {
        "collecting"
    }
}

#[tokio::test]
async fn feed_flows_through_to_the_writer() {
    let feed = concat!(
        r#"{"kind":"synced"}"#,
        "\n",
        r#"{"kind":"added","event":{"reason":"Scheduled","message":"assigned","count":1,"involved_object":{"kind":"Pod","name":"web-1","namespace":"default"},"source":{"component":"default-scheduler"}}}"#,
        "\n",
        "this line is not a notification\n",
        r#"{"kind":"updated","old":{"reason":"BackOff","count":3},"event":{"reason":"BackOff","count":2,"involved_object":{"kind":"Pod","name":"web-2"},"source":{"component":"kubelet"}}}"#,
        "\n",
        r#"{"kind":"deleted","event":{"reason":"Killing","count":1}}"#,
        "\n",
        r#"{"kind":"added","event":{"reason":"Pulled","count":1,"involved_object":{"kind":"Pod","name":"web-3"},"source":{"component":"kubelet"}}}"#,
        "\n",
    );

    let writer = Arc::new(CollectingWriter::default());
    let stop = CancellationToken::new();
    let metrics = SinkMetrics::unregistered();
    let config = SinkConfig {
        flush_delay: Duration::from_secs(600),
        max_buffer_size: 100,
        max_concurrency: 10,
        log_name: "events".to_string(),
        resource: ResourceDescriptor::new("k8s_cluster"),
    };
    let (handle, engine) = sink::new(
        config,
        EntryFactory::new("kube-event-sink"),
        writer.clone(),
        metrics.clone(),
        stop.clone(),
    )
    .unwrap();
    let engine_task = tokio::spawn(engine.run());

    let source = NdjsonSource::new(BufReader::new(feed.as_bytes()), stop.clone());
    source.run(&handle).await.unwrap();
    drop(handle);
    engine_task.await.unwrap();

    let entries = writer.entries.lock().unwrap();
    let reasons: Vec<&str> = entries.iter().map(|e| e.reason.as_str()).collect();
    // Startup notice first, then the three surviving events; the deletion
    // and the malformed line leave no trace.
    assert_eq!(reasons, vec!["INFO", "Scheduled", "BackOff", "Pulled"]);

    assert_eq!(entries[0].outcome, Outcome::Info);
    assert!(entries[0].text_payload.is_some());

    assert_eq!(entries[1].resource_id, "web-1");
    assert_eq!(entries[1].source_component, "default-scheduler");
    assert!(entries[1].json_payload.is_some());

    assert_eq!(metrics.received_count("default-scheduler"), 1);
    assert_eq!(metrics.received_count("kubelet"), 2);
    assert_eq!(metrics.accepted_count(), 4);
}
