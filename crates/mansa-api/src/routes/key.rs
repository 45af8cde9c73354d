//! API 키 확인 endpoint.

use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::ApiKeyAuth;

/// 키 확인 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KeyCheckResponse {
    pub message: String,
    pub secured: bool,
}

/// API 키 검증만 수행합니다.
///
/// GET /api/key
#[utoipa::path(
    get,
    path = "/api/key",
    params(
        ("X-API-Key" = Option<String>, Header, description = "API 키")
    ),
    responses(
        (status = 200, description = "키 유효", body = KeyCheckResponse),
        (status = 401, description = "키 없음 또는 불일치", body = crate::error::ApiErrorResponse),
        (status = 500, description = "서버에 키가 설정되지 않음", body = crate::error::ApiErrorResponse)
    ),
    tag = "stocks"
)]
pub async fn key_check(_auth: ApiKeyAuth) -> Json<KeyCheckResponse> {
    Json(KeyCheckResponse {
        message: "API".to_string(),
        secured: true,
    })
}
