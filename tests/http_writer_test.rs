// HTTP delivery against a mocked collector.
use kube_event_sink::domain::{ClusterEvent, EventSource, ObjectRef, ResourceDescriptor};
use kube_event_sink::normalize::EntryFactory;
use kube_event_sink::sink::SinkMetrics;
use kube_event_sink::writer::{HttpWriter, LogWriter};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_event() -> ClusterEvent {
    ClusterEvent {
        reason: "Scheduled".to_string(),
        message: "Successfully assigned default/web-1 to node-1".to_string(),
        count: 1,
        involved_object: ObjectRef {
            kind: "Pod".to_string(),
            name: "web-1".to_string(),
            namespace: Some("default".to_string()),
        },
        source: EventSource {
            component: "default-scheduler".to_string(),
            host: None,
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn posts_batch_as_single_json_document() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/write"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let metrics = SinkMetrics::unregistered();
    let writer = HttpWriter::new(&format!("{}/write", mock_server.uri()), metrics.clone()).unwrap();

    let factory = EntryFactory::new("kube-event-sink");
    let entries = vec![factory.from_event(&sample_event())];
    let resource = ResourceDescriptor::new("k8s_cluster").with_label("env", "staging");

    let accepted = writer.write(&entries, "events", &resource).await;
    assert_eq!(accepted, 1);
    assert_eq!(metrics.request_count("200"), 1);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["log_name"], "events");
    assert_eq!(body["resource"]["kind"], "k8s_cluster");
    assert_eq!(body["resource"]["labels"]["env"], "staging");
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert_eq!(body["entries"][0]["reason"], "Scheduled");
    assert_eq!(body["entries"][0]["outcome"], "SUCCESS");
    assert_eq!(body["entries"][0]["resource_id"], "web-1");
}

#[tokio::test]
async fn rejected_batch_counts_zero_accepted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let metrics = SinkMetrics::unregistered();
    let writer = HttpWriter::new(&mock_server.uri(), metrics.clone()).unwrap();

    let factory = EntryFactory::new("kube-event-sink");
    let entries = vec![
        factory.from_event(&sample_event()),
        factory.from_event(&sample_event()),
    ];
    let resource = ResourceDescriptor::new("k8s_cluster");

    let accepted = writer.write(&entries, "events", &resource).await;
    assert_eq!(accepted, 0);
    assert_eq!(metrics.request_count("500"), 1);
}

#[tokio::test]
async fn unreachable_collector_counts_zero_accepted() {
    let metrics = SinkMetrics::unregistered();
    // Port 9 is discard; nothing listens there in the test environment.
    let writer = HttpWriter::new("http://127.0.0.1:9/write", metrics.clone()).unwrap();

    let factory = EntryFactory::new("kube-event-sink");
    let entries = vec![factory.from_event(&sample_event())];
    let resource = ResourceDescriptor::new("k8s_cluster");

    let accepted = writer.write(&entries, "events", &resource).await;
    assert_eq!(accepted, 0);
    assert_eq!(metrics.request_count("error"), 1);
}
