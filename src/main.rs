//! # folio 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성
//! 4. `blogs` 테이블 준비
//! 5. 애플리케이션 상태(외부 API 클라이언트, 템플릿, 세션 저장소) 조립
//! 6. HTTP 서버 시작

use std::str::FromStr;

use anyhow::Result; // anyhow::Result: 어떤 에러 타입이든 담을 수 있는 범용 Result 타입
use folio::{build_router, config::Config, db, routes::AppState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다 (.ok()).
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 folio, tower_http, axum 모듈을 debug 레벨로 출력합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!(
        env = %config.app_env,
        "Starting folio server on {}:{}",
        config.host,
        config.port
    );

    // ── 4단계: SQLite 연결 풀 생성 ──
    // create_if_missing: DB 파일이 없으면 새로 만듭니다.
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // ── 5단계: 테이블 준비 ──
    // 핸들러도 필요할 때 테이블을 만들지만, 시작 시 한 번 확인해 둡니다.
    db::init_blogs_table(&pool).await?;

    // ── 6단계: 애플리케이션 상태 조립 ──
    let state = AppState::from_config(pool, &config)?;

    // ── 7단계: 라우터 설정 ──
    if !std::path::Path::new(&config.static_path).exists() {
        tracing::warn!("Static directory {} not found", config.static_path);
    }
    let app = build_router(state, &config.static_path);

    // ── 8단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
