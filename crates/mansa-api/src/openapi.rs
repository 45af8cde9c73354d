//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성하고
//! `/api-docs/openapi.json` 경로로 제공합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::{routing::get, Json, Router};
use mansa_core::{DateRange, QueryMode, StocksPayload};
use utoipa::OpenApi;

use crate::error::ApiErrorResponse;
use crate::routes::{HealthResponse, KeyCheckResponse, ReadyResponse, RootResponse};

/// OpenAPI JSON 경로.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Mansa Stocks API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mansa Stocks API",
        description = r#"
# Mansa Stocks API

티커 또는 회사명으로 연도별(historical) 및 시계열(fundamental) 주식 지표를 조회합니다.

## 인증

`/api/*` 엔드포인트는 `X-API-Key` 헤더가 필요합니다.
서버 설정 `api_key.system = "FALSE"`이면 검증을 생략합니다.

## 범위 형식

- `years`: `2020` 또는 `2020,2023`
- `dates`: `2024`, `2024-02`, `2024-02-15` 또는 `2024-01-01,2024-06-30`
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "http://localhost:3200", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "stocks", description = "주식 데이터 - historical/fundamental 조회")
    ),
    components(
        schemas(
            RootResponse,
            HealthResponse,
            ReadyResponse,
            KeyCheckResponse,
            ApiErrorResponse,
            StocksPayload,
            DateRange,
            QueryMode,
        )
    ),
    paths(
        crate::routes::health::root,
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::key::key_check,
        crate::routes::stocks::get_historical,
        crate::routes::stocks::get_fundamental,
    )
)]
pub struct ApiDoc;

/// OpenAPI JSON 라우터.
pub fn openapi_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
}
