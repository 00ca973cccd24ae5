//! # 미들웨어 모듈
//!
//! - `auth`: 관리자 세션 저장소와 Bearer 토큰 추출기

pub mod auth;
