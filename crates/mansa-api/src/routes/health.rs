//! 헬스 체크 endpoint.
//!
//! 서버 상태 확인을 위한 헬스 체크 엔드포인트를 제공합니다.
//! 로드밸런서나 오케스트레이션 시스템(Kubernetes 등)에서 사용됩니다.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

/// 루트 응답 메시지.
pub const ROOT_MESSAGE: &str = "Mansa (Stocks API)";

/// 루트 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
}

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 항상 "healthy"
    pub status: String,

    /// 서비스 이름
    pub service: String,

    /// 설정된 포트
    pub port: u16,

    /// 현재 Unix 시간(초, 소수점 포함 문자열)
    pub timestamp: String,
}

/// 준비 상태 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadyResponse {
    /// "ready" | "unavailable"
    pub status: String,

    /// 데이터베이스 상태 ("up" | "down")
    pub database: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,
}

fn unix_timestamp() -> String {
    let now = chrono::Utc::now();
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

/// 서비스 식별 메시지.
///
/// GET /
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "서비스 식별", body = RootResponse)
    ),
    tag = "health"
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// 서버가 응답 가능한 상태인지만 확인합니다. 인증이 필요 없습니다.
/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "서버 동작 중", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.service_name.clone(),
        port: state.port,
        timestamp: unix_timestamp(),
    })
}

/// 상세 헬스 체크 (readiness probe용).
///
/// 데이터베이스 연결을 확인합니다.
/// GET /health/ready
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "요청 처리 가능", body = ReadyResponse),
        (status = 503, description = "데이터베이스 연결 불가", body = ReadyResponse)
    ),
    tag = "health"
)]
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, database, status_code) = if state.is_store_healthy().await {
        ("ready", "up", StatusCode::OK)
    } else {
        ("unavailable", "down", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = ReadyResponse {
        status: status.to_string(),
        database: database.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
    };

    (status_code, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use crate::repository::MemoryStockStore;
    use crate::state::{create_test_state, create_test_state_with};

    async fn get_json<T: serde::de::DeserializeOwned>(
        app: Router,
        uri: &str,
    ) -> (StatusCode, T) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_root_message() {
        let app = Router::new().route("/", get(root));
        let (status, body): (_, RootResponse) = get_json(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.message, "Mansa (Stocks API)");
    }

    #[tokio::test]
    async fn test_health_check_reports_service() {
        let state = Arc::new(create_test_state());
        let app = Router::new()
            .nest("/health", health_router())
            .with_state(state);

        let (status, health): (_, HealthResponse) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(health.status, "healthy");
        assert_eq!(health.service, "Mansa");
        assert_eq!(health.port, 3200);
        assert!(health.timestamp.parse::<f64>().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_health_ready_up() {
        let state = Arc::new(create_test_state());
        let app = Router::new()
            .nest("/health", health_router())
            .with_state(state);

        let (status, ready): (_, ReadyResponse) = get_json(app, "/health/ready").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ready.status, "ready");
        assert_eq!(ready.database, "up");
        assert!(!ready.version.is_empty());
    }

    #[tokio::test]
    async fn test_health_ready_store_down() {
        let state = Arc::new(create_test_state_with(MemoryStockStore::new().failing()));
        let app = Router::new()
            .nest("/health", health_router())
            .with_state(state);

        let (status, ready): (_, ReadyResponse) = get_json(app, "/health/ready").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ready.database, "down");
    }
}
