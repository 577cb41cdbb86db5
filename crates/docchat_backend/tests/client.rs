use std::time::Duration;

use docchat_backend::{ApiClient, ApiError, ClientSettings, StagedUpload};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(ClientSettings {
        base_url: server.uri(),
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(2),
    })
    .expect("client")
}

#[tokio::test]
async fn ask_parses_answer_sources_and_session_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "42",
            "sources": ["guide.pdf"],
            "session_id": "s1",
        })))
        .mount(&server)
        .await;

    let outcome = client_for(&server).ask("ping", None).await.expect("ask ok");
    assert_eq!(outcome.answer, "42");
    assert_eq!(outcome.sources, vec!["guide.pdf".to_string()]);
    assert_eq!(outcome.session_id.as_deref(), Some("s1"));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("question=ping"));
    assert!(!body.contains("session_id"));
}

#[tokio::test]
async fn ask_sends_session_id_when_held() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_string_contains("session_id=s1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"answer": "ok"})),
        )
        .mount(&server)
        .await;

    let outcome = client_for(&server)
        .ask("ping", Some("s1"))
        .await
        .expect("ask ok");
    assert_eq!(outcome.answer, "ok");
    assert_eq!(outcome.sources, Vec::<String>::new());
    assert_eq!(outcome.session_id, None);
}

#[tokio::test]
async fn ask_surfaces_backend_detail_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "detail": "No documents have been loaded",
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).ask("ping", None).await.unwrap_err();
    match &err {
        ApiError::Backend { status, detail } => {
            assert_eq!(*status, 400);
            assert_eq!(detail, "No documents have been loaded");
        }
        other => panic!("expected backend error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "No documents have been loaded");
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(500).set_body_string("gateway blew up"))
        .mount(&server)
        .await;

    let err = client_for(&server).ask("ping", None).await.unwrap_err();
    assert_eq!(err.to_string(), "Error processing question");
}

#[tokio::test]
async fn malformed_answer_shape_is_rejected_at_the_boundary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let err = client_for(&server).ask("ping", None).await.unwrap_err();
    match err {
        ApiError::Shape { endpoint, .. } => assert_eq!(endpoint, "/ask"),
        other => panic!("expected shape error, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_posts_staged_files_as_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("a.txt");
    std::fs::write(&file_path, "alpha content").unwrap();

    client_for(&server)
        .upload(&[StagedUpload {
            name: "a.txt".to_string(),
            path: file_path,
            content_type: Some("text/plain".to_string()),
        }])
        .await
        .expect("upload ok");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"files\""));
    assert!(body.contains("filename=\"a.txt\""));
    assert!(body.contains("alpha content"));
}

#[tokio::test]
async fn upload_of_missing_file_fails_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .upload(&[StagedUpload {
            name: "ghost.txt".to_string(),
            path: "/nonexistent/ghost.txt".into(),
            content_type: Some("text/plain".to_string()),
        }])
        .await
        .unwrap_err();

    match err {
        ApiError::FileRead { name, .. } => assert_eq!(name, "ghost.txt"),
        other => panic!("expected file read error, got {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn index_website_posts_crawl_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/index-website"))
        .and(body_string_contains("max_pages=50"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    client_for(&server)
        .index_website("https://example.com", 50)
        .await
        .expect("index ok");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("base_url="));
}

#[tokio::test]
async fn status_ignores_extra_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "is_processing": false,
            "processed_files": 0,
            "total_files": 0,
            "chunks_created": 9,
            "total_documents": 2,
            "document_list": ["a.txt", "b.pdf"],
        })))
        .mount(&server)
        .await;

    let status = client_for(&server).status().await.expect("status ok");
    assert!(!status.is_processing);
    assert_eq!(status.chunks_created, 9);
}
