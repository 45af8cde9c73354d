//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/` - 서비스 식별
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/key` - API 키 확인
//! - `/api/historical` - 연도별 필드 조회
//! - `/api/fundamental` - 날짜 범위 시계열 조회

pub mod health;
pub mod key;
pub mod stocks;

pub use health::{health_router, HealthResponse, ReadyResponse, RootResponse};
pub use key::KeyCheckResponse;
pub use stocks::{stocks_router, FundamentalQuery, HistoricalQuery};

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health::root))
        .nest("/health", health_router())
        .nest("/api", stocks_router())
}
