//! # 블로그 초안 생성 파이프라인
//!
//! 자막 텍스트를 받아 두 단계의 LLM 호출로 블로그 초안을 만듭니다.
//!
//! ```text
//! transcript ──▶ [1. 추출(extractor) 에이전트] ──▶ 핵심 요약
//!                                                   │
//!                     [2. 작성(writer) 에이전트] ◀──┘ ──▶ JSON ──▶ BlogDraft
//! ```
//!
//! 두 호출은 반드시 순서대로 실행되며, 각각 `RetryPolicy`로 감싸져
//! 429/503 응답에만 재시도합니다. 작성 단계의 응답에서 JSON 객체를
//! 찾지 못하거나 필수 필드가 비어 있으면 부분 결과 없이 에러를 반환합니다.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    models::BlogDraft,
    services::{
        llm::{LlmError, TextGenerator},
        retry::RetryPolicy,
    },
};

/// 이보다 긴 자막은 잘라서 모델에 보냅니다.
pub const MAX_TRANSCRIPT_CHARS: usize = 50_000;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to extract information from transcript")]
    EmptyExtraction,
    #[error("Failed to generate blog content")]
    EmptyDraft,
    #[error("Failed to parse JSON response from Writer Agent")]
    MissingJson,
    #[error("Writer Agent returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Writer Agent response is missing required field `{0}`")]
    MissingField(&'static str),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// 작성 에이전트가 돌려준 JSON의 원본 형태. 모든 필드를 검증 전까지 선택 항목으로 받습니다.
#[derive(Debug, Deserialize)]
struct RawDraft {
    title: Option<String>,
    slug: Option<String>,
    excerpt: Option<String>,
    content: Option<String>,
}

pub struct BlogGenerator {
    llm: Arc<dyn TextGenerator>,
    retry: RetryPolicy,
}

impl BlogGenerator {
    pub fn new(llm: Arc<dyn TextGenerator>, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    /// 자막에서 블로그 초안을 생성합니다.
    ///
    /// `video_id`는 작성 단계 프롬프트에 원본 영상 링크를 넣기 위해 사용합니다.
    pub async fn generate(
        &self,
        transcript: &str,
        video_id: &str,
    ) -> Result<BlogDraft, GenerationError> {
        let transcript = truncate_transcript(transcript);

        tracing::info!("Step 1: Extracting key information...");
        let extracted = self.call(&extraction_prompt(&transcript)).await?;
        if extracted.trim().is_empty() {
            return Err(GenerationError::EmptyExtraction);
        }

        tracing::info!("Step 2: Writing blog post...");
        let written = self.call(&writer_prompt(&extracted, video_id)).await?;
        if written.trim().is_empty() {
            return Err(GenerationError::EmptyDraft);
        }

        parse_draft(&written)
    }

    async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        self.retry.run(|| self.llm.generate(prompt)).await
    }
}

/// 자막이 너무 길면 문자 단위로 잘라 `...`을 붙입니다.
pub fn truncate_transcript(text: &str) -> String {
    match text.char_indices().nth(MAX_TRANSCRIPT_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// 작성 에이전트의 응답에서 블로그 초안을 꺼냅니다.
///
/// 응답 텍스트의 첫 `{`부터 마지막 `}`까지를 JSON 객체로 간주합니다.
/// 모델이 코드 펜스나 설명 문장을 덧붙여도 동작하도록 하기 위함입니다.
pub fn parse_draft(output: &str) -> Result<BlogDraft, GenerationError> {
    let start = output.find('{').ok_or(GenerationError::MissingJson)?;
    let end = output.rfind('}').ok_or(GenerationError::MissingJson)?;
    if end < start {
        return Err(GenerationError::MissingJson);
    }

    let raw: RawDraft = serde_json::from_str(&output[start..=end])?;

    let title = required(raw.title, "title")?;
    let excerpt = required(raw.excerpt, "excerpt")?;
    let content = required(raw.content, "content")?;
    let slug = slug::slugify(required(raw.slug, "slug")?);
    if slug.is_empty() {
        return Err(GenerationError::MissingField("slug"));
    }

    Ok(BlogDraft {
        title,
        slug,
        excerpt,
        content,
        // 커버 이미지는 자동 생성하지 않습니다. 관리자가 직접 업로드합니다.
        cover_image: String::new(),
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, GenerationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(GenerationError::MissingField(field))
}

fn extraction_prompt(transcript: &str) -> String {
    format!(
        r#"You are an expert technical researcher. Analyze the following video transcript and extract the core knowledge.

Goal: Create a structured summary that a blog writer can use to write a high-quality technical article.

Transcript:
{transcript}

Output Requirements:
1. **Core Topic**: What is this video mainly about?
2. **Key Takeaways**: List the 3-5 most important points.
3. **Technical Details**: Extract code concepts, commands, library names, or specific logic mentioned.
4. **Structure**: Suggest a logical heading structure for a blog post (Introduction, H2s, Conclusion)."#
    )
}

fn writer_prompt(extracted: &str, video_id: &str) -> String {
    format!(
        r#"You are an expert technical blog writer and developer advocate.
Write a complete, polished blog post based on the following extracted research.

Research Summary:
{extracted}

Video URL: https://www.youtube.com/watch?v={video_id}

Requirements:
1. **Title**: Catchy, SEO-optimized, technical.
2. **Slug**: URL-friendly version of the title.
3. **Excerpt**: A compelling 2-sentence hook.
4. **Content (Markdown)**:
   - Write a full, long-form technical article.
   - Use **H2** and **H3** headers frequently to break up text.
   - Keep paragraphs short (2-3 sentences max).
   - Use **Bold** for key concepts and *Italics* for subtle emphasis.
   - Use `> Blockquotes` for key takeaways and important notes.
   - Use bullet points, numbered lists and tables where they help.
   - Use code blocks with a language specification (e.g. ```python).
   - **Image Handling**: DO NOT generate images. Insert prompts where images should go,
     formatted as `> **Image Prompt:** [Detailed description of what the image should show]`.
     Place them naturally throughout the text and include one **Cover Image Prompt**
     at the very beginning of the content body.
5. **Format**: Return ONLY valid JSON with keys: "title", "slug", "excerpt", "content"."#
    )
}
