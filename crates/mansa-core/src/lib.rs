//! # Mansa Core
//!
//! 주식 참조 데이터 API의 핵심 도메인 로직을 제공합니다.
//!
//! - 연도/날짜 범위 정규화 ([`domain::parse_date_range`], [`domain::parse_year_range`])
//! - 파라미터 바인딩 SQL 생성 ([`domain::QueryBuilder`])
//! - 스키마 컬럼 허용 목록 ([`domain::ColumnCatalog`])
//! - 결과 행 및 응답 변환 ([`domain::ResultRow`], [`domain::shape`])
//! - API 키 검증 ([`domain::AccessGate`])
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
