mod helpers;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::Router;
use serde_json::{Value, json};
use tower::ServiceExt;

use folio::application::ports::VectorStore;
use folio::infrastructure::observability::REQUEST_ID_HEADER;
use folio::presentation::{AppState, create_router};

use std::sync::Arc;

use helpers::{GatedLlmClient, MINIMAL_PDF, PNG_MAGIC, TestSession, TestSessionBuilder};

const BOUNDARY: &str = "folio-test-boundary";
const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

fn app() -> (Router, TestSession) {
    let session = TestSessionBuilder::new(&["The sky is blue.", "The grass is green."]).build();
    let router = create_router(AppState::new(session.controller.clone(), MAX_UPLOAD_BYTES));
    (router, session)
}

fn upload_request(filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/v1/documents")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn query_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn given_running_app_when_checking_health_then_returns_healthy() {
    let (router, _session) = app();

    let response = router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn given_running_app_when_requesting_root_then_serves_html_page() {
    let (router, _session) = app();

    let response = router.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("type=\"file\""));
    assert!(html.contains("/api/v1/query"));
}

#[tokio::test]
async fn given_new_session_when_reading_snapshot_then_phase_is_idle() {
    let (router, _session) = app();

    let response = router.oneshot(get("/api/v1/session")).await.unwrap();

    let body = json_body(response).await;
    assert_eq!(body["phase"], "idle");
    assert_eq!(body["accepts_queries"], false);
    assert_eq!(body["busy"], false);
    assert_eq!(body["index_size"], 0);
    assert!(body["document"].is_null());
}

#[tokio::test]
async fn given_no_document_when_querying_then_returns_conflict() {
    let (router, _session) = app();

    let response = router
        .oneshot(query_request(json!({ "question": "What colour is the sky?" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("no document"));
}

#[tokio::test]
async fn given_blank_question_when_querying_then_returns_bad_request() {
    let (router, _session) = app();

    let response = router
        .oneshot(query_request(json!({ "question": "  " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_zero_top_k_when_querying_then_returns_bad_request() {
    let (router, _session) = app();

    let response = router
        .oneshot(query_request(json!({ "question": "sky?", "top_k": 0 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("top_k"));
}

#[tokio::test]
async fn given_query_in_flight_when_reading_snapshot_then_session_is_busy() {
    let llm = Arc::new(GatedLlmClient::default());
    let session = TestSessionBuilder::new(&["The sky is blue."])
        .llm_client(llm.clone())
        .build();
    let router = create_router(AppState::new(session.controller.clone(), MAX_UPLOAD_BYTES));
    router
        .clone()
        .oneshot(upload_request("notes.pdf", "application/pdf", MINIMAL_PDF))
        .await
        .unwrap();

    let query = tokio::spawn(
        router
            .clone()
            .oneshot(query_request(json!({ "question": "sky?" }))),
    );
    llm.started.notified().await;

    let snapshot = json_body(router.clone().oneshot(get("/api/v1/session")).await.unwrap()).await;
    assert_eq!(snapshot["phase"], "querying");
    assert_eq!(snapshot["accepts_queries"], false);
    assert_eq!(snapshot["busy"], true);

    llm.release.notify_one();
    assert_eq!(query.await.unwrap().unwrap().status(), StatusCode::OK);
    let snapshot = json_body(router.oneshot(get("/api/v1/session")).await.unwrap()).await;
    assert_eq!(snapshot["phase"], "answer_ready");
    assert_eq!(snapshot["busy"], false);
}

#[tokio::test]
async fn given_pdf_upload_when_posting_then_document_becomes_ready() {
    let (router, _session) = app();

    let response = router
        .clone()
        .oneshot(upload_request("notes.pdf", "application/pdf", MINIMAL_PDF))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["filename"], "notes.pdf");
    assert_eq!(body["page_count"], 2);
    assert_eq!(body["chunk_count"], 2);

    let snapshot = json_body(router.oneshot(get("/api/v1/session")).await.unwrap()).await;
    assert_eq!(snapshot["phase"], "document_ready");
    assert_eq!(snapshot["accepts_queries"], true);
    assert_eq!(snapshot["document"]["filename"], "notes.pdf");
}

#[tokio::test]
async fn given_non_pdf_file_when_uploading_then_returns_bad_request() {
    let (router, session) = app();

    let response = router
        .oneshot(upload_request("notes.txt", "text/plain", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(session.vector_store.len().await, 0);
}

#[tokio::test]
async fn given_pdf_name_with_non_pdf_bytes_when_uploading_then_returns_unprocessable() {
    let (router, session) = app();

    let response = router
        .oneshot(upload_request("notes.pdf", "application/pdf", b"plain text"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(session.vector_store.len().await, 0);
}

#[tokio::test]
async fn given_ready_document_when_querying_with_previews_then_returns_answer_and_sources() {
    let (router, _session) = app();
    router
        .clone()
        .oneshot(upload_request("notes.pdf", "application/pdf", MINIMAL_PDF))
        .await
        .unwrap();

    let response = router
        .oneshot(query_request(json!({
            "question": "What colour is the sky?",
            "top_k": 1,
            "include_previews": true
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["answer"], "Mock answer");
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["index"], 1);
    assert_eq!(sources[0]["page_number"], 1);
    assert_eq!(sources[0]["text"], "The sky is blue.");
    assert_eq!(sources[0]["start_offset"], 0);
    assert_eq!(sources[0]["end_offset"], 16);
    assert!(sources[0]["preview_png_base64"].as_str().unwrap().starts_with("iVBORw0KGgo"));
    assert!(body["warnings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn given_no_document_when_requesting_preview_then_returns_not_found() {
    let (router, _session) = app();

    let response = router
        .oneshot(get("/api/v1/documents/pages/1/preview"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_ready_document_when_requesting_preview_then_returns_png() {
    let (router, _session) = app();
    router
        .clone()
        .oneshot(upload_request("notes.pdf", "application/pdf", MINIMAL_PDF))
        .await
        .unwrap();

    let response = router
        .oneshot(get("/api/v1/documents/pages/2/preview?width=300"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(PNG_MAGIC));
}

#[tokio::test]
async fn given_page_zero_when_requesting_preview_then_returns_bad_request() {
    let (router, _session) = app();

    let response = router
        .oneshot(get("/api/v1/documents/pages/0/preview"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_request_id_header_when_calling_then_it_is_echoed() {
    let (router, _session) = app();
    let request = Request::builder()
        .uri("/health")
        .header(REQUEST_ID_HEADER, "req-42")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
}

#[tokio::test]
async fn given_no_request_id_when_calling_then_one_is_generated() {
    let (router, _session) = app();

    let response = router.oneshot(get("/health")).await.unwrap();

    let id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}
