//! # 블로그 글 데이터베이스 쿼리 모듈
//!
//! `blogs` 테이블에 대한 CRUD 쿼리 함수들이 정의되어 있습니다.
//!
//! 모든 함수는 `async`이며 `SqlitePool`을 받아 데이터베이스와 상호작용합니다.
//! 테이블은 마이그레이션 대신 각 진입 함수(목록/조회/생성/수정/삭제)의 첫 단계에서
//! `CREATE TABLE IF NOT EXISTS`로 만들어집니다 (`init_blogs_table`).

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

const BLOG_COLUMNS: &str =
    "id, title, slug, excerpt, content, cover_image, published, created_at, updated_at";

/// `blogs` 테이블이 없으면 생성합니다.
///
/// 여러 번 호출해도 안전합니다 (IF NOT EXISTS).
pub async fn init_blogs_table(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blogs (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL,
            slug        TEXT NOT NULL UNIQUE,
            excerpt     TEXT,
            content     TEXT NOT NULL,
            cover_image TEXT,
            published   BOOLEAN NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            updated_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// 블로그 글 목록을 최신순으로 조회합니다.
///
/// # 매개변수
/// - `published_only`: true면 공개된 글만, false면 초안까지 모두
pub async fn list_blogs(pool: &SqlitePool, published_only: bool) -> Result<Vec<Blog>, AppError> {
    init_blogs_table(pool).await?;

    // 같은 밀리초에 만들어진 글도 순서가 흔들리지 않도록 id를 보조 정렬 키로 씁니다.
    let sql = if published_only {
        format!(
            "SELECT {} FROM blogs WHERE published = 1 ORDER BY created_at DESC, id DESC",
            BLOG_COLUMNS
        )
    } else {
        format!("SELECT {} FROM blogs ORDER BY created_at DESC, id DESC", BLOG_COLUMNS)
    };

    let blogs = sqlx::query_as::<_, Blog>(&sql).fetch_all(pool).await?;
    Ok(blogs)
}

/// ID 또는 slug로 단일 글을 조회합니다.
///
/// 키가 숫자로만 이루어져 있으면 ID로, 그 외에는 slug로 찾습니다.
///
/// # 반환값
/// - `Ok(Some(Blog))`: 글을 찾은 경우
/// - `Ok(None)`: 해당하는 글이 없는 경우
pub async fn get_blog(pool: &SqlitePool, id_or_slug: &str) -> Result<Option<Blog>, AppError> {
    init_blogs_table(pool).await?;

    match parse_id(id_or_slug) {
        Some(id) => get_blog_by_id(pool, id).await,
        None => get_blog_by_slug(pool, id_or_slug).await,
    }
}

pub async fn get_blog_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Blog>, AppError> {
    let blog = sqlx::query_as::<_, Blog>(&format!("SELECT {} FROM blogs WHERE id = ?", BLOG_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(blog)
}

pub async fn get_blog_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Blog>, AppError> {
    let blog = sqlx::query_as::<_, Blog>(&format!("SELECT {} FROM blogs WHERE slug = ?", BLOG_COLUMNS))
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    Ok(blog)
}

/// 다른 글이 이미 이 slug를 쓰고 있는지 확인합니다.
///
/// `exclude_id`가 주어지면 그 글 자신은 검사에서 제외합니다 (수정 시 사용).
pub async fn slug_taken(
    pool: &SqlitePool,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<bool, AppError> {
    let row: Option<(i64,)> = match exclude_id {
        Some(id) => {
            sqlx::query_as("SELECT id FROM blogs WHERE slug = ? AND id != ?")
                .bind(slug)
                .bind(id)
                .fetch_optional(pool)
                .await?
        }
        None => {
            sqlx::query_as("SELECT id FROM blogs WHERE slug = ?")
                .bind(slug)
                .fetch_optional(pool)
                .await?
        }
    };

    Ok(row.is_some())
}

/// 새 글을 생성합니다.
///
/// slug가 이미 존재하면 `AppError::Conflict`를 반환합니다.
/// 삽입 후 생성된 행을 다시 조회하여 DB 기본값(created_at 등)이 채워진 객체를 반환합니다.
pub async fn create_blog(pool: &SqlitePool, blog: &NewBlog) -> Result<Blog, AppError> {
    init_blogs_table(pool).await?;

    if slug_taken(pool, &blog.slug, None).await? {
        return Err(AppError::Conflict("A blog with this slug already exists".to_string()));
    }

    let id = insert_blog(pool, blog).await?;

    get_blog_by_id(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created blog".to_string()))
}

/// 행을 삽입하고 새 ID를 반환합니다.
///
/// 동시에 같은 slug로 생성 요청이 들어오면 둘 다 `slug_taken` 검사를 통과할 수 있으므로,
/// UNIQUE 제약 위반도 `AppError::Conflict`로 바꿉니다.
async fn insert_blog(pool: &SqlitePool, blog: &NewBlog) -> Result<i64, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO blogs (title, slug, excerpt, content, cover_image, published)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&blog.title)
    .bind(&blog.slug)
    .bind(&blog.excerpt)
    .bind(&blog.content)
    .bind(&blog.cover_image)
    .bind(blog.published)
    .execute(pool)
    .await
    .map_err(slug_conflict)?;

    Ok(result.last_insert_rowid())
}

/// `blogs.slug`의 UNIQUE 위반은 409, 그 외는 일반 DB 에러로 변환합니다.
fn slug_conflict(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("A blog with this slug already exists".to_string())
        }
        _ => AppError::Database(e),
    }
}

/// 글을 부분 수정합니다.
///
/// 요청에서 None인 필드는 `COALESCE`로 기존 값을 유지합니다.
///
/// # 반환값
/// - `Ok(Some(Blog))`: 수정 성공
/// - `Ok(None)`: 해당 ID의 글이 없음
/// - `Err(AppError::Conflict)`: 새 slug를 다른 글이 사용 중
pub async fn update_blog(
    pool: &SqlitePool,
    id: i64,
    req: &UpdateBlogRequest,
) -> Result<Option<Blog>, AppError> {
    init_blogs_table(pool).await?;

    if get_blog_by_id(pool, id).await?.is_none() {
        return Ok(None);
    }

    if let Some(slug) = &req.slug {
        if slug_taken(pool, slug, Some(id)).await? {
            return Err(AppError::Conflict("A blog with this slug already exists".to_string()));
        }
    }

    sqlx::query(
        r#"
        UPDATE blogs
        SET title       = COALESCE(?, title),
            slug        = COALESCE(?, slug),
            excerpt     = COALESCE(?, excerpt),
            content     = COALESCE(?, content),
            cover_image = COALESCE(?, cover_image),
            published   = COALESCE(?, published),
            updated_at  = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(&req.title)
    .bind(&req.slug)
    .bind(&req.excerpt)
    .bind(&req.content)
    .bind(&req.cover_image)
    .bind(req.published)
    .bind(id)
    .execute(pool)
    .await
    .map_err(slug_conflict)?;

    get_blog_by_id(pool, id).await
}

/// 글을 삭제합니다.
///
/// # 반환값
/// - `Ok(true)`: 삭제 성공
/// - `Ok(false)`: 해당 ID의 글이 없음
pub async fn delete_blog(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    init_blogs_table(pool).await?;

    let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 숫자로만 이루어진 키를 ID로 해석합니다.
pub fn parse_id(key: &str) -> Option<i64> {
    if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
        key.parse().ok()
    } else {
        None
    }
}
