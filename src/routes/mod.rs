//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과, 모든 핸들러가 공유하는 `AppState`를 정의합니다.
//!
//! 각 하위 모듈:
//! - `auth`: 관리자 로그인, 세션 확인, 로그아웃
//! - `blogs`: 블로그 글 CRUD
//! - `generate`: YouTube 영상 → AI 블로그 초안, 재생목록 조회
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `init`: 테이블 생성
//! - `pages`: 서버 렌더링 페이지 (포트폴리오, 블로그 목록/본문)
//! - `upload`: 이미지 업로드

pub mod auth;
pub mod blogs;
pub mod generate;
pub mod health;
pub mod init;
pub mod pages;
pub mod upload;

use std::sync::Arc;

use sqlx::SqlitePool;
use tera::Tera;

use crate::{
    config::Config,
    middleware::auth::SessionStore,
    models::Portfolio,
    services::{
        cloudinary::CloudinaryClient,
        generator::BlogGenerator,
        llm::GeminiClient,
        retry::RetryPolicy,
        youtube::{PlaylistResolver, TranscriptExtractor},
    },
};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 무거운 구성 요소는 `Arc`로 감싸 clone 비용을 참조 카운트 증가로 줄입니다.
///
/// 설정이 빠진 기능은 `None`으로 두고, 해당 엔드포인트가 호출될 때 에러를 돌려줍니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    /// 관리자 세션 저장소 (메모리)
    pub sessions: SessionStore,
    pub admin_password: Option<String>,
    /// `GEMINI_API_KEY`가 없으면 None
    pub generator: Option<Arc<BlogGenerator>>,
    pub transcripts: Arc<TranscriptExtractor>,
    pub playlists: Arc<PlaylistResolver>,
    /// Cloudinary 자격 증명이 없으면 None
    pub uploader: Option<Arc<CloudinaryClient>>,
    pub templates: Arc<Tera>,
    pub portfolio: Arc<Portfolio>,
}

impl AppState {
    /// 설정값으로 모든 구성 요소를 조립합니다.
    ///
    /// 하나의 `reqwest::Client`를 만들어 모든 외부 API 클라이언트가 연결 풀을 공유합니다.
    pub fn from_config(pool: SqlitePool, config: &Config) -> anyhow::Result<Self> {
        let client = http_client()?;

        let generator = config.gemini_api_key.as_ref().map(|key| {
            let llm = GeminiClient::new(client.clone(), key.clone(), config.gemini_model.clone());
            Arc::new(BlogGenerator::new(Arc::new(llm), RetryPolicy::default()))
        });
        if generator.is_none() {
            tracing::warn!("GEMINI_API_KEY not set; AI generation is disabled");
        }

        let uploader = config
            .cloudinary
            .clone()
            .map(|c| Arc::new(CloudinaryClient::new(client.clone(), c)));
        if uploader.is_none() {
            tracing::warn!("Cloudinary credentials not set; image upload is disabled");
        }

        Ok(Self {
            pool,
            sessions: SessionStore::new(),
            admin_password: config.admin_password.clone(),
            generator,
            transcripts: Arc::new(TranscriptExtractor::from_config(client.clone(), config)),
            playlists: Arc::new(PlaylistResolver::new(client, config.youtube_api_key.clone())),
            uploader,
            templates: Arc::new(pages::load_templates()?),
            portfolio: Arc::new(Portfolio::load(config.portfolio_path.as_deref())?),
        })
    }
}

/// 외부 API 호출에 공유하는 HTTP 클라이언트
///
/// 요청 전체 타임아웃은 없습니다. 시간 제한은 이미지 업로드(60초)에만 적용됩니다.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
        .build()
}
