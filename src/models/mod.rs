//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `auth`: 로그인 요청/응답
//! - `blog`: 블로그 글과 생성/수정 요청
//! - `generate`: 자막과 AI 블로그 초안
//! - `portfolio`: 메인 페이지 콘텐츠
//! - `upload`: 이미지 업로드 결과

pub mod auth;
pub mod blog;
pub mod generate;
pub mod portfolio;
pub mod upload;

pub use auth::*;
pub use blog::*;
pub use generate::*;
pub use portfolio::*;
pub use upload::*;
