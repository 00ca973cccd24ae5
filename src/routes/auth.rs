//! # 인증 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST /api/auth`        → 비밀번호 확인 후 세션 토큰 발급
//! - `GET  /api/auth/verify` → 현재 토큰이 유효한지 확인
//! - `POST /api/auth/logout` → 현재 토큰 폐기

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    middleware::auth::{verify_password, AdminSession},
    models::{LoginRequest, LoginResponse},
    routes::AppState,
};

/// `POST /api/auth`: 관리자 로그인
///
/// 비밀번호가 맞으면 24시간 유효한 bearer 토큰을 발급합니다.
/// `ADMIN_PASSWORD`가 설정되지 않은 서버에서는 500을 반환합니다.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if !verify_password(&req.password, state.admin_password.as_deref())? {
        tracing::warn!("Rejected admin login attempt");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let session = state.sessions.create_session();
    tracing::info!("Admin session created");

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at.to_rfc3339(),
    }))
}

/// `GET /api/auth/verify`: `AdminSession` 추출기를 통과했다면 유효한 세션입니다.
pub async fn verify(_session: AdminSession) -> Json<Value> {
    Json(json!({ "valid": true }))
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>, session: AdminSession) -> Json<Value> {
    state.sessions.delete_session(&session.token);
    Json(json!({ "message": "Logged out successfully" }))
}
