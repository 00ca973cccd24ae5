//! Outbound API clients against local stand-in servers.
//!
//! Each test binds an axum router on an ephemeral port and points the real
//! client at it with `with_base_url`.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use folio::{
    config::CloudinaryConfig,
    routes::http_client,
    services::{
        cloudinary::{sign, CloudinaryClient, UploadError},
        generator::{BlogGenerator, GenerationError},
        llm::{GeminiClient, LlmError, TextGenerator},
        retry::RetryPolicy,
    },
};

const DRAFT: &str = r###"{"title": "Lifetimes", "slug": "Lifetimes In Depth", "excerpt": "Why 'a matters.", "content": "## Intro"}"###;

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn candidates(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

/// Answers 503 to the first request, then behaves like the model API.
async fn overloaded_once(
    State(hits): State<Arc<AtomicU32>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (StatusCode::UNAUTHORIZED, "bad key").into_response();
    }
    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
        return (StatusCode::SERVICE_UNAVAILABLE, "The model is overloaded").into_response();
    }

    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
    let text = if prompt.contains("Research Summary") {
        DRAFT
    } else {
        "Core topic: lifetimes"
    };
    Json(candidates(text)).into_response()
}

#[tokio::test]
async fn overloaded_model_is_retried_through_the_pipeline() {
    let hits = Arc::new(AtomicU32::new(0));
    let base = serve(Router::new().fallback(overloaded_once).with_state(hits.clone())).await;

    let llm = GeminiClient::new(reqwest::Client::new(), "test-key", "test-model").with_base_url(base);
    let generator = BlogGenerator::new(Arc::new(llm), RetryPolicy::immediate(3));

    let draft = generator.generate("a transcript", "abc123").await.unwrap();
    assert_eq!(draft.title, "Lifetimes");
    assert_eq!(draft.slug, "lifetimes-in-depth");
    // one rejected call, then extraction and writing
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn client_errors_from_model_are_not_retried() {
    let hits = Arc::new(AtomicU32::new(0));
    let router = Router::new()
        .fallback(|State(hits): State<Arc<AtomicU32>>| async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (StatusCode::BAD_REQUEST, "API key not valid")
        })
        .with_state(hits.clone());
    let base = serve(router).await;

    let llm = GeminiClient::new(reqwest::Client::new(), "test-key", "test-model").with_base_url(base);
    let generator = BlogGenerator::new(Arc::new(llm), RetryPolicy::immediate(3));

    let err = generator.generate("a transcript", "abc123").await.unwrap_err();
    match err {
        GenerationError::Llm(LlmError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn shared_client_waits_for_slow_model_responses() {
    let router = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(300)).await;
        Json(candidates("finally"))
    });
    let base = serve(router).await;

    let llm = GeminiClient::new(http_client().unwrap(), "test-key", "test-model").with_base_url(base);
    assert_eq!(llm.generate("write a long post").await.unwrap(), "finally");
}

fn cloudinary_config() -> CloudinaryConfig {
    CloudinaryConfig {
        cloud_name: "demo".to_string(),
        api_key: "key123".to_string(),
        api_secret: "secret456".to_string(),
    }
}

type Fields = Arc<Mutex<HashMap<String, String>>>;

async fn accept_upload(State(fields): State<Fields>, mut multipart: Multipart) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap();
        fields.lock().unwrap().insert(name, value);
    }

    Json(json!({
        "secure_url": "https://res.cloudinary.com/demo/image/upload/blog/pic.png",
        "public_id": "blog/pic",
        "width": 640,
        "height": 480
    }))
}

#[tokio::test]
async fn upload_sends_signed_form() {
    let fields: Fields = Arc::default();
    let base = serve(Router::new().fallback(accept_upload).with_state(fields.clone())).await;

    let client = CloudinaryClient::new(reqwest::Client::new(), cloudinary_config()).with_base_url(base);
    let result = client
        .upload(b"png-bytes".to_vec(), "pic.png", "image/png", "blog")
        .await
        .unwrap();

    assert_eq!(result.public_id, "blog/pic");
    assert_eq!((result.width, result.height), (640, 480));

    let fields = fields.lock().unwrap();
    assert_eq!(fields["file"], "png-bytes");
    assert_eq!(fields["api_key"], "key123");
    assert_eq!(fields["folder"], "blog");
    assert_eq!(fields["signature_algorithm"], "sha256");
    let expected = sign(&[("folder", "blog"), ("timestamp", fields["timestamp"].as_str())], "secret456");
    assert_eq!(fields["signature"], expected);
}

#[tokio::test]
async fn upload_api_error_carries_cloudinary_message() {
    let router = Router::new().fallback(|| async {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "Invalid Signature 3f2a" } })),
        )
    });
    let base = serve(router).await;

    let client = CloudinaryClient::new(reqwest::Client::new(), cloudinary_config()).with_base_url(base);
    let err = client
        .upload(b"png".to_vec(), "pic.png", "image/png", "blog")
        .await
        .unwrap_err();

    match err {
        UploadError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid Signature 3f2a");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_upload_times_out() {
    let router = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(600)).await;
        StatusCode::OK
    });
    let base = serve(router).await;

    let client = CloudinaryClient::new(http_client().unwrap(), cloudinary_config()).with_base_url(base);
    let err = client
        .upload(b"png".to_vec(), "pic.png", "image/png", "blog")
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Timeout));
}
