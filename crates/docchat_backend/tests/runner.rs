use std::sync::{Arc, Mutex};
use std::time::Duration;

use docchat_backend::{
    ApiClient, ClientSettings, JobError, JobEvent, JobKind, JobRunner, JobSink, PollSettings,
    StagedUpload,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<JobEvent>>>,
}

impl TestSink {
    fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn take(&self) -> Vec<JobEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl JobSink for TestSink {
    fn emit(&self, event: JobEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientSettings {
        base_url: server.uri(),
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(2),
    })
    .expect("client")
}

fn fast_poll() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(5),
        max_ticks: None,
    }
}

fn staged_file(dir: &tempfile::TempDir, name: &str) -> StagedUpload {
    let path = dir.path().join(name);
    std::fs::write(&path, "file body").unwrap();
    StagedUpload {
        name: name.to_string(),
        path,
        content_type: Some("text/plain".to_string()),
    }
}

#[tokio::test]
async fn upload_job_emits_deduplicated_progress_then_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    // Two identical in-flight ticks, then the terminal one.
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "is_processing": true,
            "processed_files": 1,
            "total_files": 2,
            "chunks_created": 3,
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "is_processing": false,
            "processed_files": 2,
            "total_files": 2,
            "chunks_created": 7,
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&server);
    let runner = JobRunner::new(&client, fast_poll());
    let sink = TestSink::new();

    let outcome = runner
        .run(
            JobKind::Upload {
                files: vec![staged_file(&dir, "a.txt")],
            },
            &sink,
        )
        .await
        .expect("job ok");

    assert_eq!(outcome.processed, 2);
    assert_eq!(outcome.chunks, 7);
    assert_eq!(
        sink.take(),
        vec![
            JobEvent::Started,
            JobEvent::Progress {
                processed: 1,
                total: 2,
                chunks: 3,
            },
            JobEvent::Completed {
                processed: 2,
                chunks: 7,
            },
        ]
    );
}

#[tokio::test]
async fn submission_failure_reports_detail_and_skips_polling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "detail": "A document processing job is already running",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "is_processing": false,
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&server);
    let runner = JobRunner::new(&client, fast_poll());
    let sink = TestSink::new();

    let err = runner
        .run(
            JobKind::Upload {
                files: vec![staged_file(&dir, "a.txt")],
            },
            &sink,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::Submission(_)));
    assert_eq!(
        sink.take(),
        vec![
            JobEvent::Started,
            JobEvent::Failed {
                message: "A document processing job is already running".to_string(),
            },
        ]
    );

    let status_hits = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == "/status")
        .count();
    assert_eq!(status_hits, 0);
}

#[tokio::test]
async fn poll_failure_aborts_a_submitted_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/index-website"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let runner = JobRunner::new(&client, fast_poll());
    let sink = TestSink::new();

    let err = runner
        .run(
            JobKind::Crawl {
                base_url: "https://example.com".to_string(),
                max_pages: 50,
            },
            &sink,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, JobError::Poll(_)));
    let events = sink.take();
    assert_eq!(events[0], JobEvent::Started);
    assert!(matches!(events[1], JobEvent::Failed { .. }));
    assert_eq!(events.len(), 2);
}
