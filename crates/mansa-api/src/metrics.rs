//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 조회 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use mansa_core::{QueryMode, StocksError};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// # 반환값
///
/// `/metrics` 엔드포인트에서 메트릭을 렌더링하기 위한 `PrometheusHandle`
///
/// # Errors
///
/// 버킷 설정이 잘못되었거나 레코더가 이미 설치되어 있으면 실패합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .set_buckets_for_metric(
            Matcher::Full("stocks_rows_returned".to_string()),
            &[1.0, 5.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 조회 메트릭 헬퍼 함수
// ============================================================================

/// 조회 결과 라벨.
pub fn query_outcome<T>(result: &Result<T, StocksError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(StocksError::NotFound { .. }) => "not_found",
        Err(StocksError::BadRequest(_)) => "bad_request",
        Err(StocksError::Unauthorized) => "unauthorized",
        Err(StocksError::Store(_)) => "store_error",
        Err(StocksError::Configuration(_)) => "error",
    }
}

/// 조회 카운터 증가.
pub fn record_stocks_query(mode: QueryMode, outcome: &'static str) {
    counter!(
        "stocks_queries_total",
        "mode" => mode.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

/// 반환된 행 수 기록.
pub fn record_rows_returned(mode: QueryMode, rows: usize) {
    histogram!("stocks_rows_returned", "mode" => mode.as_str()).record(rows as f64);
}

/// 경로에서 쿼리 문자열을 제거하고 라벨 길이를 제한합니다.
///
/// 등록되지 않은 경로로 라벨이 폭증하지 않도록 알려진 경로 외에는 `other`로 묶습니다.
pub fn normalize_path(path: &str) -> &'static str {
    match path.split('?').next().unwrap_or_default() {
        "/" => "/",
        "/health" => "/health",
        "/health/ready" => "/health/ready",
        "/api/key" => "/api/key",
        "/api/historical" => "/api/historical",
        "/api/fundamental" => "/api/fundamental",
        "/api-docs/openapi.json" => "/api-docs/openapi.json",
        "/metrics" => "/metrics",
        _ => "other",
    }
}
