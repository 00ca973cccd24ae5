//! # 이미지 업로드 핸들러
//!
//! - `POST /api/upload` (관리자): multipart 필드 `file`을 Cloudinary `blog` 폴더에 올립니다.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppError,
    middleware::auth::AdminSession,
    models::UploadResult,
    services::cloudinary::{UploadError, DEFAULT_FOLDER},
    routes::AppState,
};

/// 업로드 요청 본문 최대 크기 (10MB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub async fn upload_image(
    State(state): State<AppState>,
    _session: AdminSession,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResult>), AppError> {
    // `file` 이외의 필드는 건너뜁니다.
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Invalid multipart body"))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Failed to read file"))?;

        file = Some((file_name, content_type, bytes));
        break;
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    tracing::info!(file_name = %file_name, content_type = %content_type, size = bytes.len(), "File received");

    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest("File must be an image".to_string()));
    }

    let uploader = state.uploader.as_ref().ok_or(UploadError::MissingCredentials)?;
    let result = uploader
        .upload(bytes.to_vec(), &file_name, &content_type, DEFAULT_FOLDER)
        .await?;

    tracing::info!(url = %result.url, "Upload successful");
    Ok((StatusCode::CREATED, Json(result)))
}

/// 본문 크기 제한(`MAX_UPLOAD_BYTES`)을 넘긴 요청은 413, 나머지 multipart 오류는 400입니다.
fn multipart_error(e: MultipartError, context: &str) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(error = %e, "Upload exceeds body limit");
        return AppError::PayloadTooLarge(format!(
            "File is too large. Maximum size is {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        ));
    }
    AppError::BadRequest(format!("{}: {}", context, e.body_text()))
}
