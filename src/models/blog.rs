//! # 블로그 글 모델 정의
//!
//! `blogs` 테이블 한 행과, 생성/수정 요청 본문을 나타내는 구조체들입니다.

use serde::{Deserialize, Serialize};

/// 블로그 글 엔티티: DB의 `blogs` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Blog {
    /// 자동 증가 정수 ID
    pub id: i64,
    pub title: String,
    /// URL에 쓰이는 고유 식별자 (UNIQUE 인덱스)
    pub slug: String,
    pub excerpt: Option<String>,
    /// 마크다운 본문
    pub content: String,
    /// 커버 이미지 URL
    pub cover_image: Option<String>,
    /// 공개 여부. false면 초안(draft)
    pub published: bool,
    /// 생성 시각 (ISO 8601 형식: "2026-02-16T12:00:00.000Z")
    pub created_at: String,
    pub updated_at: String,
}

/// 글 생성 요청: `POST /api/blogs`의 요청 본문
///
/// 필수 필드도 `Option`으로 받아서, 누락 시 axum의 422 대신
/// 핸들러에서 400과 명확한 메시지를 돌려줍니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub published: Option<bool>,
}

/// 검증을 통과한 글 생성 데이터
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub published: bool,
}

impl CreateBlogRequest {
    /// 필수 필드(title, slug, content)를 확인하고 `NewBlog`로 변환합니다.
    ///
    /// 빈 문자열인 excerpt/cover_image는 NULL로 저장합니다.
    pub fn validate(self) -> Option<NewBlog> {
        let title = non_blank(self.title)?;
        let slug = non_blank(self.slug)?;
        let content = non_blank(self.content)?;

        Some(NewBlog {
            title,
            slug,
            excerpt: non_blank(self.excerpt),
            content,
            cover_image: non_blank(self.cover_image),
            published: self.published.unwrap_or(false),
        })
    }
}

/// 글 수정 요청: `PUT /api/blogs/{id}`의 요청 본문
///
/// None인 필드는 변경하지 않습니다 (COALESCE 병합).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub published: Option<bool>,
}

/// `GET /api/blogs`의 쿼리 파라미터
#[derive(Debug, Default, Deserialize)]
pub struct ListBlogsQuery {
    /// `?all=true`: 인증된 관리자라면 초안까지 포함
    pub all: Option<bool>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
