//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: 데이터베이스 연결 문자열 (필수)
//! - `ADMIN_PASSWORD`: 관리자 비밀번호
//! - `CLOUDINARY_CLOUD_NAME` / `CLOUDINARY_API_KEY` / `CLOUDINARY_API_SECRET`: 이미지 호스팅 자격 증명
//! - `GEMINI_API_KEY` / `GEMINI_MODEL`: 블로그 초안 생성용 LLM 설정
//! - `YOUTUBE_API_KEY`: 재생목록 조회용 YouTube Data API 키 (선택)
//! - `APP_ENV`: 실행 환경. `development`이면 yt-dlp 자막 폴백을 허용합니다.
//! - `HOST` / `PORT`: 서버 바인딩 주소
//! - `STATIC_PATH`: 정적 파일 디렉토리
//! - `PORTFOLIO_PATH`: 메인 페이지 콘텐츠(JSON) 경로 (선택)

use std::env;

/// 기본 LLM 모델 이름
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Cloudinary 자격 증명 묶음
///
/// 세 값이 모두 있어야 업로드가 가능하므로 하나의 구조체로 묶어 `Option`으로 다룹니다.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// 데이터베이스 연결 문자열 (예: "sqlite:data/folio.db?mode=rwc")
    pub database_url: String,
    /// 관리자 비밀번호. 없으면 로그인 시 500 에러가 발생합니다.
    pub admin_password: Option<String>,
    /// 이미지 업로드용 자격 증명. 하나라도 빠지면 None
    pub cloudinary: Option<CloudinaryConfig>,
    /// Gemini API 키
    pub gemini_api_key: Option<String>,
    /// 사용할 Gemini 모델 이름
    pub gemini_model: String,
    /// YouTube Data API 키 (재생목록 조회에만 사용)
    pub youtube_api_key: Option<String>,
    /// 실행 환경 이름 (기본값: "production")
    pub app_env: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 정적 파일 디렉토리 (기본값: "public")
    pub static_path: String,
    /// 메인 페이지 콘텐츠 파일 경로. None이면 내장 콘텐츠 사용
    pub portfolio_path: Option<String>,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 선택 항목이거나 기본값이 있습니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        let cloudinary = match (
            optional("CLOUDINARY_CLOUD_NAME"),
            optional("CLOUDINARY_API_KEY"),
            optional("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")?, // 필수: 없으면 에러
            admin_password: optional("ADMIN_PASSWORD"),
            cloudinary,
            gemini_api_key: optional("GEMINI_API_KEY"),
            gemini_model: optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            youtube_api_key: optional("YOUTUBE_API_KEY"),
            app_env: optional("APP_ENV").unwrap_or_else(|| "production".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            static_path: env::var("STATIC_PATH").unwrap_or_else(|_| "public".to_string()),
            portfolio_path: optional("PORTFOLIO_PATH"),
        })
    }

    /// 개발 모드 여부. yt-dlp 같은 로컬 전용 도구는 개발 모드에서만 사용합니다.
    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }
}

/// 값이 비어 있으면 설정되지 않은 것으로 취급합니다.
fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
