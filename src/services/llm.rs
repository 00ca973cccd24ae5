//! # LLM 클라이언트
//!
//! 블로그 초안 생성 파이프라인이 사용하는 텍스트 생성 모델 추상화입니다.
//! 실제 구현은 Gemini `generateContent` REST API를 호출합니다.
//! 파이프라인은 `TextGenerator` 트레이트에만 의존하므로 테스트에서 가짜 구현으로 교체할 수 있습니다.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::services::retry::Retryable;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Model API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl Retryable for LlmError {
    /// 요청 한도 초과(429)와 과부하(503)만 재시도합니다.
    fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Api { status: 429 | 503, .. })
    }
}

/// 프롬프트 하나를 받아 모델이 생성한 텍스트를 돌려주는 트레이트
///
/// 응답에 텍스트가 전혀 없으면 빈 문자열을 반환합니다.
/// 빈 응답을 어떻게 다룰지는 호출자가 결정합니다.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message });
        }

        let response = resp.json::<GenerateContentResponse>().await?;
        Ok(response.text())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// 첫 번째 후보의 텍스트 파트들을 이어 붙입니다.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
