//! # AI 초안 생성 관련 모델
//!
//! YouTube 영상에서 뽑은 자막(`Transcript`)과
//! LLM 파이프라인이 만들어 낸 블로그 초안(`BlogDraft`)을 정의합니다.

use serde::{Deserialize, Serialize};

/// `POST /api/ai/generate` 요청 본문
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub url: Option<String>,
}

/// `GET /api/ai/playlist` 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct PlaylistQuery {
    pub url: Option<String>,
}

/// 영상 하나의 자막. 저장하지 않고 요청 처리 중에만 사용합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub video_id: String,
    /// 메타데이터를 따로 조회하지 않으므로 "Video <id>" 형태의 자리표시자
    pub title: String,
    /// 자막 문장들을 공백 하나로 이어 붙인 텍스트
    pub text: String,
    /// 자막 길이의 합(초). 알 수 없으면 0
    pub duration: f64,
}

impl Transcript {
    pub fn new(video_id: &str, text: String, duration: f64) -> Self {
        Self {
            video_id: video_id.to_string(),
            title: format!("Video {}", video_id),
            text,
            duration,
        }
    }
}

/// 작성자(writer) 에이전트가 만든 블로그 초안
///
/// 네 개의 텍스트 필드는 항상 비어 있지 않습니다.
/// 커버 이미지는 자동 생성하지 않으므로 `cover_image`는 항상 빈 문자열입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogDraft {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: String,
}
