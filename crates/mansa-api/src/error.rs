//! 통합 API 에러 응답 타입.
//!
//! 모든 핸들러는 [`StocksError`]를 반환하고, 이 모듈의 [`ApiError`]가
//! 이를 HTTP 상태 코드와 [`ApiErrorResponse`] 본문으로 변환합니다.
//!
//! | 에러 | 상태 | 코드 |
//! |------|------|------|
//! | `Unauthorized` | 401 | `UNAUTHORIZED` |
//! | `Configuration` | 500 | `API_KEY_NOT_CONFIGURED` |
//! | `BadRequest` | 400 | `BAD_REQUEST` |
//! | `NotFound` | 404 | `NOT_FOUND` |
//! | `Store` | 500 | `STORE_ERROR` |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mansa_core::StocksError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "No data found for 'PETR4'",
///   "details": {"search": "PETR4"},
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "BAD_REQUEST", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// [`StocksError`]를 HTTP 응답으로 바꾸는 어댑터.
#[derive(Debug)]
pub struct ApiError(pub StocksError);

impl From<StocksError> for ApiError {
    fn from(err: StocksError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// 상태 코드와 에러 코드.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            StocksError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            StocksError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "API_KEY_NOT_CONFIGURED")
            }
            StocksError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            StocksError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            StocksError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.0.to_string();

        let body = match &self.0 {
            StocksError::NotFound { search } => ApiErrorResponse::with_details(
                code,
                message,
                serde_json::json!({ "search": search }),
            ),
            _ => ApiErrorResponse::new(code, message),
        };

        (status, Json(body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
