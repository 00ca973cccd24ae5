//! # folio
//!
//! 포트폴리오 사이트와 1인 블로그 백엔드입니다.
//!
//! 라우터 조립(`build_router`)을 라이브러리로 분리하여
//! `main.rs`와 통합 테스트(`tests/`)가 같은 라우터를 사용합니다.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use routes::{auth, blogs, generate, health, init, pages, upload, AppState};

/// 전체 라우터를 만듭니다.
///
/// - `/api/*`: JSON API
/// - `/`, `/blogs`, `/blogs/{slug}`: 서버 렌더링 페이지
/// - 그 외 경로: `static_path` 디렉토리의 정적 파일
pub fn build_router(state: AppState, static_path: &str) -> Router {
    // 인증 관련 라우트 (로그인, 세션 확인, 로그아웃)
    let auth_routes = Router::new()
        .route("/auth", post(auth::login))
        .route("/auth/verify", get(auth::verify))
        .route("/auth/logout", post(auth::logout));

    // AI 초안 생성 라우트
    let ai_routes = Router::new()
        .route("/ai/generate", post(generate::generate_blog))
        .route("/ai/playlist", get(generate::list_playlist));

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(ai_routes)
        // 블로그 CRUD. axum 0.8부터 경로 파라미터는 `{name}` 문법을 씁니다.
        .route("/blogs", get(blogs::list_blogs).post(blogs::create_blog))
        .route(
            "/blogs/{id}",
            get(blogs::get_blog)
                .put(blogs::update_blog)
                .delete(blogs::delete_blog),
        )
        // 이미지 업로드. 기본 본문 제한(2MB) 대신 10MB까지 허용
        .route(
            "/upload",
            post(upload::upload_image).layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES)),
        )
        .route("/init", post(init::init_database))
        .route("/health", get(health::health_check));

    let page_routes = Router::new()
        .route("/", get(pages::home))
        .route("/blogs", get(pages::blogs_index))
        .route("/blogs/{slug}", get(pages::blog_post));

    // 개발 편의를 위해 모든 출처를 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .fallback_service(ServeDir::new(static_path))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
