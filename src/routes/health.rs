//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/health` → `{ "status": "ok" }`
//!
//! 컨테이너 오케스트레이터나 업타임 모니터가 서버 가동 여부를 확인할 때 사용합니다.

use axum::Json;
use serde_json::{json, Value};

/// `GET /api/health`
///
/// State도, Path도 필요 없는 가장 단순한 핸들러입니다.
/// `Result`를 쓰지 않으므로 실패하지 않고 항상 200 OK를 반환합니다.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok"
    }))
}
