//! # AI 초안 생성 핸들러
//!
//! ## 엔드포인트
//! - `POST /api/ai/generate`      → YouTube 영상 URL로 블로그 초안 생성 (관리자)
//! - `GET  /api/ai/playlist?url=` → 재생목록의 video ID 목록 (관리자)
//!
//! 생성 결과는 저장하지 않습니다. 관리자가 편집기에서 다듬은 뒤 `POST /api/blogs`로 저장합니다.

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::auth::AdminSession,
    models::{BlogDraft, GenerateRequest, PlaylistQuery},
    routes::AppState,
    services::youtube::{extract_video_id, is_playlist},
};

/// `POST /api/ai/generate`
///
/// 처리 순서:
/// 1. URL 확인 → video ID 추출 (실패 시 400)
/// 2. 자막 수집 (실패 시 400)
/// 3. 두 단계 LLM 파이프라인 (실패 시 500)
pub async fn generate_blog(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<BlogDraft>, AppError> {
    let url = req
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("YouTube URL is required".to_string()))?;

    let video_id = extract_video_id(&url)
        .ok_or_else(|| AppError::BadRequest("Invalid YouTube URL".to_string()))?;

    let transcript = state
        .transcripts
        .get_video_transcript(&video_id)
        .await
        .ok_or_else(|| {
            AppError::BadRequest(
                "Failed to fetch video transcript. The video might not have captions enabled."
                    .to_string(),
            )
        })?;
    tracing::info!(video_id = %video_id, chars = transcript.text.len(), "Transcript fetched");

    let generator = state.generator.as_ref().ok_or_else(|| {
        AppError::Upstream("GEMINI_API_KEY is not set in server environment".to_string())
    })?;

    let draft = generator.generate(&transcript.text, &video_id).await?;
    tracing::info!(video_id = %video_id, slug = %draft.slug, "Blog draft generated");
    Ok(Json(draft))
}

/// `GET /api/ai/playlist?url=...` → `{ "video_ids": [...] }`
///
/// 재생목록 조회가 실패하면 빈 배열을 돌려줍니다.
pub async fn list_playlist(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<PlaylistQuery>,
) -> Result<Json<Value>, AppError> {
    let url = query
        .url
        .filter(|u| is_playlist(u))
        .ok_or_else(|| AppError::BadRequest("A playlist URL with a list parameter is required".to_string()))?;

    let video_ids = state.playlists.get_playlist_videos(&url).await;
    Ok(Json(json!({ "video_ids": video_ids })))
}
