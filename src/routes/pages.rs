//! # 서버 렌더링 페이지
//!
//! ## 엔드포인트
//! - `GET /`             → 포트폴리오 메인 페이지
//! - `GET /blogs`        → 공개된 블로그 글 목록
//! - `GET /blogs/{slug}` → 블로그 글 본문 (마크다운 → HTML, 읽기 시간 표시)
//!
//! 템플릿(`templates/*.html`)은 `include_str!`로 바이너리에 포함되어
//! 실행 위치와 상관없이 같은 화면을 렌더링합니다.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Datelike};
use serde::Serialize;
use tera::{Context, Tera};

use crate::{db, error::AppError, models::Blog, routes::AppState, services::markdown};

/// (이름, 내용) 쌍. 이름이 `.html`로 끝나므로 Tera가 자동으로 HTML 이스케이프를 적용합니다.
const TEMPLATES: [(&str, &str); 5] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("blogs.html", include_str!("../../templates/blogs.html")),
    ("blog.html", include_str!("../../templates/blog.html")),
    ("not_found.html", include_str!("../../templates/not_found.html")),
];

/// 내장 템플릿을 모두 등록한 Tera 인스턴스를 만듭니다.
///
/// `add_raw_templates`는 상속(`{% extends %}`) 관계를 한 번에 해석하므로
/// 개별 등록 대신 묶어서 넘깁니다.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES)?;
    Ok(tera)
}

/// 목록 화면용 요약 정보
#[derive(Debug, Serialize)]
struct BlogCard<'a> {
    title: &'a str,
    slug: &'a str,
    excerpt: Option<&'a str>,
    cover_image: Option<&'a str>,
    date: String,
}

impl<'a> From<&'a Blog> for BlogCard<'a> {
    fn from(blog: &'a Blog) -> Self {
        Self {
            title: &blog.title,
            slug: &blog.slug,
            excerpt: blog.excerpt.as_deref(),
            cover_image: blog.cover_image.as_deref(),
            date: format_date(&blog.created_at),
        }
    }
}

/// `GET /`
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let mut context = Context::new();
    context.insert("portfolio", state.portfolio.as_ref());
    context.insert("year", &chrono::Utc::now().year());

    Ok(Html(state.templates.render("home.html", &context)?))
}

/// `GET /blogs`
pub async fn blogs_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let blogs = db::list_blogs(&state.pool, true).await?;
    let cards: Vec<BlogCard> = blogs.iter().map(BlogCard::from).collect();

    let mut context = Context::new();
    context.insert("portfolio", state.portfolio.as_ref());
    context.insert("blogs", &cards);

    Ok(Html(state.templates.render("blogs.html", &context)?))
}

/// `GET /blogs/{slug}`: 초안(published = false)은 존재하지 않는 글처럼 404를 돌려줍니다.
pub async fn blog_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    db::init_blogs_table(&state.pool).await?;
    let blog = match db::get_blog_by_slug(&state.pool, &slug).await? {
        Some(blog) if blog.published => blog,
        _ => return not_found_page(&state),
    };

    let mut context = Context::new();
    context.insert("portfolio", state.portfolio.as_ref());
    context.insert("blog", &BlogCard::from(&blog));
    context.insert("content_html", &markdown::render_markdown(&blog.content));
    context.insert("read_time", &markdown::reading_time_minutes(&blog.content));

    let html = state.templates.render("blog.html", &context)?;
    Ok(Html(html).into_response())
}

fn not_found_page(state: &AppState) -> Result<Response, AppError> {
    let mut context = Context::new();
    context.insert("portfolio", state.portfolio.as_ref());

    let html = state.templates.render("not_found.html", &context)?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

/// `2026-02-16T12:00:00.000Z` → `February 16, 2026`. 파싱할 수 없으면 원문 그대로.
fn format_date(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}
