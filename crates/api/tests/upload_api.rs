//! Integration tests for the upload endpoints: video presigning against a
//! mock CDN management API, and PDF storage on the local file store.

mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use common::{body_bytes, body_json, get, post_json, post_multipart};
use etude_core::signing::upload_signature;
use sqlx::PgPool;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Mock CDN management API
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockManagement {
    create_calls: AtomicUsize,
    last_access_key: Mutex<Option<String>>,
    last_title: Mutex<Option<String>>,
    fail_create: AtomicBool,
}

async fn spawn_management(mock: Arc<MockManagement>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let app = Router::new()
        .route("/library/{library_id}/videos", post(create_video))
        .with_state(mock);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

async fn create_video(
    State(mock): State<Arc<MockManagement>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    mock.create_calls.fetch_add(1, Ordering::SeqCst);
    *mock.last_access_key.lock().unwrap() = headers
        .get("AccessKey")
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    *mock.last_title.lock().unwrap() = body
        .get("title")
        .and_then(|title| title.as_str())
        .map(String::from);

    if mock.fail_create.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "library under maintenance").into_response();
    }

    Json(serde_json::json!({"guid": "mock-guid-0001"})).into_response()
}

/// Config wired to the mock management API with known credentials.
fn signing_config(api_base: String) -> etude_api::config::ServerConfig {
    let mut config = common::test_config();
    config.bunny.library_id = Some("lib-42".to_string());
    config.bunny.api_key = Some("key-secret".to_string());
    config.bunny.api_base = api_base;
    config
}

// ---------------------------------------------------------------------------
// Test: POST /uploads/videos/sign returns a complete signed slot
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_returns_complete_slot(pool: PgPool) {
    let mock = Arc::new(MockManagement::default());
    let base = spawn_management(Arc::clone(&mock)).await;
    let config = signing_config(base);
    let upload_endpoint = config.bunny.upload_endpoint.clone();

    let before = chrono::Utc::now().timestamp();
    let app = common::build_test_app_with(pool, config);
    let response = post_json(
        app,
        "/api/v1/uploads/videos/sign",
        serde_json::json!({"title": "Lesson 1 video"}),
    )
    .await;
    let after = chrono::Utc::now().timestamp();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["videoId"], "mock-guid-0001");
    assert_eq!(json["libraryId"], "lib-42");
    assert_eq!(json["uploadUrl"], upload_endpoint);

    // One hour of validity, measured from the moment of signing.
    let expire = json["authorizationExpire"].as_i64().unwrap();
    assert!(expire >= before + 3600 && expire <= after + 3600);

    // The signature must be reproducible from the response fields and
    // the shared secret.
    let signature = json["authorizationSignature"].as_str().unwrap();
    assert_eq!(signature.len(), 64);
    assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    let expected = upload_signature("lib-42", "key-secret", expire, "mock-guid-0001");
    assert_eq!(signature, expected);

    // The slot was created upstream with our key and title.
    assert_eq!(mock.create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        mock.last_access_key.lock().unwrap().as_deref(),
        Some("key-secret")
    );
    assert_eq!(
        mock.last_title.lock().unwrap().as_deref(),
        Some("Lesson 1 video")
    );
}

// ---------------------------------------------------------------------------
// Test: non-string and missing titles are rejected before the CDN is called
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_with_non_string_title_returns_400(pool: PgPool) {
    let mock = Arc::new(MockManagement::default());
    let base = spawn_management(Arc::clone(&mock)).await;

    let app = common::build_test_app_with(pool, signing_config(base));
    let response = post_json(
        app,
        "/api/v1/uploads/videos/sign",
        serde_json::json!({"title": 123}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("Title"));
    assert_eq!(mock.create_calls.load(Ordering::SeqCst), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_with_missing_title_returns_400(pool: PgPool) {
    let mock = Arc::new(MockManagement::default());
    let base = spawn_management(Arc::clone(&mock)).await;

    let app = common::build_test_app_with(pool, signing_config(base));
    let response = post_json(app, "/api/v1/uploads/videos/sign", serde_json::json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(mock.create_calls.load(Ordering::SeqCst), 0);
}

// ---------------------------------------------------------------------------
// Test: unset CDN credentials surface as a configuration error
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_without_credentials_returns_configuration_error(pool: PgPool) {
    // Default test config has no library credentials.
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/uploads/videos/sign",
        serde_json::json!({"title": "Lesson 1 video"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFIGURATION_ERROR");
    assert_eq!(json["error"], "Video host credentials not configured");
}

// ---------------------------------------------------------------------------
// Test: an upstream failure propagates the CDN's status and message
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_upstream_failure_propagates_status(pool: PgPool) {
    let mock = Arc::new(MockManagement::default());
    mock.fail_create.store(true, Ordering::SeqCst);
    let base = spawn_management(Arc::clone(&mock)).await;

    let app = common::build_test_app_with(pool, signing_config(base));
    let response = post_json(
        app,
        "/api/v1/uploads/videos/sign",
        serde_json::json!({"title": "Lesson 1 video"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("library under maintenance"));
}

// ---------------------------------------------------------------------------
// Test: POST /uploads/pdfs stores the file and serves it back
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn pdf_upload_stores_and_serves_file(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config_with_storage(dir.path().to_path_buf());
    let data = b"%PDF-1.4 fake sheet music";

    let app = common::build_test_app_with(pool.clone(), config.clone());
    let response = post_multipart(
        app,
        "/api/v1/uploads/pdfs",
        "moonlight sonata.pdf",
        "application/pdf",
        data,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["filename"], "moonlight sonata.pdf");
    assert_eq!(json["size"], data.len() as i64);

    let url = json["url"].as_str().unwrap();
    let key_path = url.strip_prefix("http://localhost:3000").unwrap();
    assert!(key_path.starts_with("/files/pdfs/"));
    // Keys are sanitized; the original name survives only in `filename`.
    assert!(key_path.ends_with("-moonlight_sonata.pdf"));

    // The key is a real file under the storage root.
    let entries: Vec<_> = std::fs::read_dir(dir.path().join("pdfs"))
        .unwrap()
        .map(|entry| entry.unwrap())
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(std::fs::read(entries[0].path()).unwrap(), data);

    // And it is reachable through the static file mount.
    let app = common::build_test_app_with(pool, config);
    let response = get(app, key_path).await;
    assert_eq!(response.status(), StatusCode::OK);
    let served = body_bytes(response).await;
    assert_eq!(&served[..], data);
}

// ---------------------------------------------------------------------------
// Test: non-PDF MIME types are rejected without writing anything
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn pdf_upload_rejects_other_mime_types(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config_with_storage(dir.path().to_path_buf());

    let app = common::build_test_app_with(pool, config);
    let response = post_multipart(
        app,
        "/api/v1/uploads/pdfs",
        "notes.txt",
        "text/plain",
        b"not sheet music",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Only PDF files are allowed");

    // Nothing was written.
    assert!(!dir.path().join("pdfs").exists());
}

// ---------------------------------------------------------------------------
// Test: a request without a "file" field is rejected
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn pdf_upload_without_file_field_returns_400(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config_with_storage(dir.path().to_path_buf());
    let app = common::build_test_app_with(pool, config);

    // Multipart body with a field named something else.
    let boundary = "----etude-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"notes\"\r\n\r\nhello\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/uploads/pdfs")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No file provided");
}
