//! 주식 참조 데이터 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (historical/fundamental 조회)
//! - `X-API-Key` 헤더 인증
//! - sqlx/PostgreSQL 쿼리 실행기
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: API 키 추출기
//! - [`repository`]: 쿼리 실행 저장소
//! - [`service`]: 서버 시작/종료 핸들
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use auth::ApiKeyAuth;
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use repository::{load_catalog, PgStockStore, StockStore};
pub use routes::*;
pub use service::{build_router, start, ServiceHandle};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use repository::MemoryStockStore;
#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, create_test_state_with};
