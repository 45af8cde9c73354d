//! 요청 단위 HTTP 메트릭.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{
    normalize_path, record_http_duration, record_http_request, record_http_response,
};

/// 요청 수, 상태별 응답 수, 처리 시간을 라우트 라벨로 기록합니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let route = normalize_path(request.uri().path());
    let method = request.method().as_str().to_owned();
    record_http_request(&method, route);

    let started = Instant::now();
    let response = next.run(request).await;

    record_http_response(&method, route, response.status().as_u16());
    record_http_duration(&method, route, started.elapsed().as_secs_f64());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_metrics_layer_unknown_route() {
        let app = Router::new()
            .route("/test", get(|| async { "OK" }))
            .layer(middleware::from_fn(metrics_layer));

        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_middleware_passes_through_errors() {
        let app = Router::new()
            .route("/api/historical", get(|| async { StatusCode::BAD_REQUEST }))
            .layer(middleware::from_fn(metrics_layer));

        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/historical?search=PETR4&fields=DY&years=2024")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
