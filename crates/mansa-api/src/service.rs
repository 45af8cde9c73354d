//! HTTP 서비스 수명 주기.
//!
//! [`start`]는 리스너를 바인딩하고 서버 태스크를 띄운 뒤 [`ServiceHandle`]을 돌려줍니다.
//! 같은 프로세스에서 여러 인스턴스를 띄울 수 있으며 전역 레지스트리는 없습니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::get,
    Router,
};
use mansa_core::ServerConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::middleware::metrics_layer;
use crate::openapi::openapi_router;
use crate::routes::create_api_router;
use crate::state::AppState;

/// 실행 중인 서비스 핸들.
pub struct ServiceHandle {
    name: String,
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServiceHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 실제로 바인딩된 주소. 포트 0으로 시작했다면 OS가 고른 포트입니다.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 외부 시그널 처리기에 넘길 종료 토큰.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 진행 중인 요청을 마친 뒤 서버를 종료합니다.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.shutdown.cancel();
        self.wait().await
    }

    /// 서버 태스크가 끝날 때까지 대기합니다.
    pub async fn wait(self) -> anyhow::Result<()> {
        self.task
            .await
            .context("Server task panicked")?
            .context("Server terminated with an I/O error")
    }
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

/// 전체 라우터 생성.
///
/// 메트릭 핸들이 있으면 `/metrics`를 함께 노출합니다.
pub fn build_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let mut router = Router::new()
        .merge(create_api_router().with_state(state.clone()))
        .merge(openapi_router());

    if let Some(handle) = state.metrics.clone() {
        let metrics_router = Router::new()
            .route("/metrics", get(metrics_handler))
            .with_state(handle);
        router = router.merge(metrics_router);
    }

    router
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
}

/// 서비스를 시작합니다.
///
/// # Errors
///
/// 주소를 바인딩할 수 없으면 실패합니다.
pub async fn start(config: &ServerConfig, state: Arc<AppState>) -> anyhow::Result<ServiceHandle> {
    let app = build_router(
        state,
        Duration::from_secs(config.request_timeout_secs),
    );

    let bind_addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    let local_addr = listener.local_addr()?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    let name = config.name.clone();

    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                signal.cancelled().await;
                warn!("Shutdown requested, draining in-flight requests");
            })
            .await
    });

    info!(service = %name, %local_addr, "API server listening");

    Ok(ServiceHandle {
        name,
        local_addr,
        shutdown,
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use crate::state::create_test_state;

    #[tokio::test]
    async fn test_router_serves_health_and_openapi() {
        let app = build_router(Arc::new(create_test_state()), Duration::from_secs(5));

        for uri in ["/", "/health", "/health/ready", "/api-docs/openapi.json"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_metrics_route_absent_without_recorder() {
        let app = build_router(Arc::new(create_test_state()), Duration::from_secs(5));

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..Default::default()
        };

        let handle = start(&config, Arc::new(create_test_state())).await.unwrap();
        assert_eq!(handle.name(), "Mansa");
        assert_ne!(handle.local_addr().port(), 0);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_two_instances_coexist() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..Default::default()
        };

        let first = start(&config, Arc::new(create_test_state())).await.unwrap();
        let second = start(&config, Arc::new(create_test_state())).await.unwrap();
        assert_ne!(first.local_addr(), second.local_addr());

        first.shutdown().await.unwrap();
        second.shutdown().await.unwrap();
    }
}
