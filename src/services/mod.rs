//! 외부 API 연동과 도메인 로직을 담당하는 서비스 계층

pub mod cloudinary;
pub mod generator;
pub mod llm;
pub mod markdown;
pub mod retry;
pub mod youtube;
