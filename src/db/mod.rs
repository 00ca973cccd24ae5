//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 하위 모듈:
//! - `blogs`: 블로그 글 CRUD 쿼리와 지연(lazy) 테이블 생성

pub mod blogs;

pub use blogs::*;
