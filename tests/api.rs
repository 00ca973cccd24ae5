//! Integration tests for the HTTP surface.
//!
//! Each test builds the full router over a fresh in-memory SQLite pool and drives
//! it with `oneshot`. External services are replaced by in-process fakes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use folio::{
    build_router,
    middleware::auth::SessionStore,
    models::{Portfolio, Transcript},
    routes::{pages, upload::MAX_UPLOAD_BYTES, AppState},
    services::{
        generator::BlogGenerator,
        llm::{LlmError, TextGenerator},
        retry::RetryPolicy,
        youtube::{CaptionStrategy, PlaylistResolver, TranscriptError, TranscriptExtractor},
    },
};

const PASSWORD: &str = "correct horse battery staple";

const DRAFT: &str = r#"{"title": "Ownership Explained", "slug": "ownership-explained", "excerpt": "Borrowing made simple. Read on.", "content": "> **Image Prompt:** a borrow checker\n\n## Why"}"#;

/// Echoes a fixed extraction, then the draft JSON.
struct FakeLlm;

#[async_trait]
impl TextGenerator for FakeLlm {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if prompt.contains("Research Summary") {
            Ok(DRAFT.to_string())
        } else {
            Ok("Core topic: ownership".to_string())
        }
    }
}

/// Has captions for exactly one video.
struct FakeCaptions;

#[async_trait]
impl CaptionStrategy for FakeCaptions {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, video_id: &str) -> Result<Transcript, TranscriptError> {
        if video_id == "dQw4w9WgXcQ" {
            Ok(Transcript::new(video_id, "today we talk about ownership".into(), 12.0))
        } else {
            Err(TranscriptError::NoCaptions)
        }
    }
}

async fn test_state(with_llm: bool) -> AppState {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let generator = with_llm.then(|| {
        Arc::new(BlogGenerator::new(Arc::new(FakeLlm), RetryPolicy::immediate(1)))
    });

    AppState {
        pool,
        sessions: SessionStore::new(),
        admin_password: Some(PASSWORD.to_string()),
        generator,
        transcripts: Arc::new(TranscriptExtractor::new(vec![
            Box::new(FakeCaptions) as Box<dyn CaptionStrategy>,
        ])),
        playlists: Arc::new(PlaylistResolver::new(reqwest::Client::new(), None)),
        uploader: None,
        templates: Arc::new(pages::load_templates().unwrap()),
        portfolio: Arc::new(Portfolio::load(None).unwrap()),
    }
}

async fn setup() -> Router {
    build_router(test_state(true).await, "public")
}

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_html(app: &Router, path: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn login(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/auth", None, Some(json!({ "password": PASSWORD }))).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create(app: &Router, token: &str, slug: &str, published: bool) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/blogs",
        Some(token),
        Some(json!({
            "title": format!("Post {}", slug),
            "slug": slug,
            "excerpt": "Short summary",
            "content": "# Heading\n\nSome **markdown** body.",
            "published": published
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn health_is_public() {
    let app = setup().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn login_issues_token_that_verifies() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = setup().await;
    let (status, body) = send(&app, Method::POST, "/api/auth", None, Some(json!({ "password": "nope" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn missing_admin_password_is_server_error() {
    let mut state = test_state(true).await;
    state.admin_password = None;
    let app = build_router(state, "public");

    let (status, _) = send(&app, Method::POST, "/api/auth", None, Some(json!({ "password": "x" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn logout_revokes_token() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, _) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/api/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_require_token() {
    let app = setup().await;

    let (status, body) = send(&app, Method::POST, "/api/blogs", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "missing_token");

    let (status, body) = send(&app, Method::DELETE, "/api/blogs/1", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "invalid_token");

    let (status, _) = send(&app, Method::POST, "/api/init", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn init_creates_table() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, body) = send(&app, Method::POST, "/api/init", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Database initialized successfully");
}

#[tokio::test]
async fn create_requires_title_slug_and_content() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/blogs",
        Some(&token),
        Some(json!({ "title": "No body", "slug": "no-body" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Title, slug, and content are required");
}

#[tokio::test]
async fn duplicate_slug_conflicts_and_unique_slug_is_retrievable() {
    let app = setup().await;
    let token = login(&app).await;

    let created = create(&app, &token, "first-post", true).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["published"], true);
    assert_eq!(created["excerpt"], "Short summary");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/blogs",
        Some(&token),
        Some(json!({ "title": "Again", "slug": "first-post", "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "A blog with this slug already exists");

    let (status, by_id) = send(&app, Method::GET, &format!("/api/blogs/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, by_slug) = send(&app, Method::GET, "/api/blogs/first-post", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id, by_slug);

    let (status, _) = send(&app, Method::GET, "/api/blogs/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_update_preserves_other_fields() {
    let app = setup().await;
    let token = login(&app).await;
    let created = create(&app, &token, "draft", false).await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/blogs/{}", id),
        Some(&token),
        Some(json!({ "title": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Renamed");
    for field in ["slug", "excerpt", "content", "cover_image", "published", "created_at"] {
        assert_eq!(updated[field], created[field], "{} changed", field);
    }

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/blogs/9999",
        Some(&token),
        Some(json!({ "title": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_rejects_slug_owned_by_another_post() {
    let app = setup().await;
    let token = login(&app).await;
    create(&app, &token, "taken", true).await;
    let other = create(&app, &token, "other", true).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/blogs/{}", other["id"]),
        Some(&token),
        Some(json!({ "slug": "taken" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn delete_removes_post_from_listing() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, _) = send(&app, Method::DELETE, "/api/blogs/42", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let created = create(&app, &token, "short-lived", true).await;
    let path = format!("/api/blogs/{}", created["id"]);

    let (status, body) = send(&app, Method::DELETE, &path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Blog deleted successfully");

    let (_, list) = send(&app, Method::GET, "/api/blogs", None, None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn drafts_are_listed_only_for_admins() {
    let app = setup().await;
    let token = login(&app).await;
    create(&app, &token, "public-post", true).await;
    create(&app, &token, "secret-draft", false).await;

    let (_, public) = send(&app, Method::GET, "/api/blogs", None, None).await;
    assert_eq!(public.as_array().unwrap().len(), 1);

    let (_, forged) = send(&app, Method::GET, "/api/blogs?all=true", Some("forged"), None).await;
    assert_eq!(forged.as_array().unwrap().len(), 1);

    let (_, all) = send(&app, Method::GET, "/api/blogs?all=true", Some(&token), None).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    // newest first
    assert_eq!(all[0]["slug"], "secret-draft");
}

#[tokio::test]
async fn generate_returns_draft() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, draft) = send(
        &app,
        Method::POST,
        "/api/ai/generate",
        Some(&token),
        Some(json!({ "url": "https://youtu.be/dQw4w9WgXcQ" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", draft);
    assert_eq!(draft["title"], "Ownership Explained");
    assert_eq!(draft["slug"], "ownership-explained");
    assert_eq!(draft["cover_image"], "");
    assert!(draft["content"].as_str().unwrap().contains("Image Prompt"));
}

#[tokio::test]
async fn generate_validates_input() {
    let app = setup().await;
    let token = login(&app).await;

    let cases = [
        (json!({}), "YouTube URL is required"),
        (json!({ "url": "https://example.com/video" }), "Invalid YouTube URL"),
        (
            json!({ "url": "https://www.youtube.com/watch?v=nocaptions1" }),
            "Failed to fetch video transcript. The video might not have captions enabled.",
        ),
    ];

    for (body, message) in cases {
        let (status, resp) = send(&app, Method::POST, "/api/ai/generate", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"]["message"], message);
    }
}

#[tokio::test]
async fn generate_without_api_key_is_server_error() {
    let app = build_router(test_state(false).await, "public");
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/ai/generate",
        Some(&token),
        Some(json!({ "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "GEMINI_API_KEY is not set in server environment");
}

#[tokio::test]
async fn playlist_requires_list_parameter() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/ai/playlist?url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3Dabc",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn multipart_body(content_type: &str, payload: &[u8]) -> (String, Vec<u8>) {
    let boundary = "folio-test-boundary";
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"pic\"\r\nContent-Type: {ct}\r\n\r\n",
        b = boundary,
        ct = content_type
    )
    .into_bytes();
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    (format!("multipart/form-data; boundary={}", boundary), body)
}

async fn upload(app: &Router, token: &str, content_type: &str) -> (StatusCode, Value) {
    upload_bytes(app, token, content_type, b"bytes").await
}

async fn upload_bytes(
    app: &Router,
    token: &str,
    content_type: &str,
    payload: &[u8],
) -> (StatusCode, Value) {
    let (header_value, body) = multipart_body(content_type, payload);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, header_value)
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn upload_rejects_non_images() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, body) = upload(&app, &token, "text/plain").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "File must be an image");
}

#[tokio::test]
async fn upload_without_credentials_reports_configuration() {
    let app = setup().await;
    let token = login(&app).await;

    let (status, body) = upload(&app, &token, "image/png").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Missing Cloudinary credentials"));
}

#[tokio::test]
async fn upload_over_body_limit_is_payload_too_large() {
    let app = setup().await;
    let token = login(&app).await;

    let oversized = vec![0u8; MAX_UPLOAD_BYTES + 1024];
    let (status, body) = upload_bytes(&app, &token, "image/png", &oversized).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "payload_too_large");
}

#[tokio::test]
async fn post_page_on_fresh_database_is_not_found() {
    // no request has created the blogs table yet
    let app = setup().await;

    let (status, html) = get_html(&app, "/blogs/anything").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!html.is_empty());
}

#[tokio::test]
async fn pages_render_published_posts_only() {
    let app = setup().await;
    let token = login(&app).await;
    create(&app, &token, "hello-world", true).await;
    create(&app, &token, "hidden", false).await;

    let (status, html) = get_html(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Alex Morgan"));

    let (status, html) = get_html(&app, "/blogs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("/blogs/hello-world"));
    assert!(!html.contains("/blogs/hidden"));

    let (status, html) = get_html(&app, "/blogs/hello-world").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<strong>markdown</strong>"));
    assert!(html.contains("1 min read"));

    let (status, _) = get_html(&app, "/blogs/hidden").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
