use serde::Serialize;

/// 이미지 호스트에 업로드된 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResult {
    pub url: String,
    pub public_id: String,
    pub width: u32,
    pub height: u32,
}
