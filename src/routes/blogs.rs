//! # 블로그 글 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/blogs`              → 공개 글 목록 (`?all=true` + 관리자 토큰이면 초안 포함)
//! - `POST   /api/blogs`              → 새 글 생성 (관리자)
//! - `GET    /api/blogs/{id_or_slug}` → 숫자면 ID, 아니면 slug로 조회
//! - `PUT    /api/blogs/{id}`         → 부분 수정 (관리자)
//! - `DELETE /api/blogs/{id}`         → 삭제 (관리자)
//!
//! 관리자 전용 핸들러는 `AdminSession` 추출기를 매개변수로 받습니다.
//! 추출기가 실패하면 핸들러 본문은 실행되지 않고 401 응답이 나갑니다.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};

use crate::{
    db,
    error::AppError,
    middleware::auth::{bearer_token, AdminSession},
    models::*,
    routes::AppState,
};

/// `GET /api/blogs`
///
/// `?all=true`라도 토큰이 없거나 유효하지 않으면 에러 대신 공개 글만 돌려줍니다.
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(query): Query<ListBlogsQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Blog>>, AppError> {
    let include_drafts = query.all.unwrap_or(false)
        && bearer_token(&headers).is_some_and(|token| state.sessions.validate_session(token));

    let blogs = db::list_blogs(&state.pool, !include_drafts).await?;
    Ok(Json(blogs))
}

/// `GET /api/blogs/{id_or_slug}`
pub async fn get_blog(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Blog>, AppError> {
    let blog = db::get_blog(&state.pool, &key)
        .await?
        .ok_or_else(AppError::blog_not_found)?;
    Ok(Json(blog))
}

/// `POST /api/blogs`: 201 Created와 함께 저장된 행을 반환합니다.
pub async fn create_blog(
    State(state): State<AppState>,
    _session: AdminSession,
    Json(req): Json<CreateBlogRequest>,
) -> Result<(StatusCode, Json<Blog>), AppError> {
    let new_blog = req
        .validate()
        .ok_or_else(|| AppError::BadRequest("Title, slug, and content are required".to_string()))?;

    let blog = db::create_blog(&state.pool, &new_blog).await?;
    tracing::info!(id = blog.id, slug = %blog.slug, "Blog created");
    Ok((StatusCode::CREATED, Json(blog)))
}

/// `PUT /api/blogs/{id}`: 요청에 포함된 필드만 바꿉니다.
pub async fn update_blog(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
    Json(req): Json<UpdateBlogRequest>,
) -> Result<Json<Blog>, AppError> {
    // 숫자가 아닌 ID는 존재할 수 없는 글로 취급합니다.
    let id = db::parse_id(&id).ok_or_else(AppError::blog_not_found)?;

    let blog = db::update_blog(&state.pool, id, &req)
        .await?
        .ok_or_else(AppError::blog_not_found)?;
    tracing::info!(id = blog.id, "Blog updated");
    Ok(Json(blog))
}

/// `DELETE /api/blogs/{id}`
pub async fn delete_blog(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = db::parse_id(&id).ok_or_else(AppError::blog_not_found)?;

    if !db::delete_blog(&state.pool, id).await? {
        return Err(AppError::blog_not_found());
    }

    tracing::info!(id, "Blog deleted");
    Ok(Json(json!({ "message": "Blog deleted successfully" })))
}
