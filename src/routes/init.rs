use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{db, error::AppError, middleware::auth::AdminSession, routes::AppState};

/// `POST /api/init`: `blogs` 테이블을 만듭니다. 이미 있으면 아무 일도 하지 않습니다.
pub async fn init_database(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Value>, AppError> {
    db::init_blogs_table(&state.pool).await?;
    Ok(Json(json!({ "message": "Database initialized successfully" })))
}
