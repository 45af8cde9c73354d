//! API 키 인증 추출기.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// API 키 헤더 이름.
pub const API_KEY_HEADER: &str = "x-api-key";

/// API 키 인증 추출기.
///
/// 검증에 성공하면 수락된 키를 담습니다. 키 검증이 꺼져 있으면 `None`입니다.
/// UTF-8이 아닌 헤더 값은 키가 없는 것으로 취급합니다.
#[derive(Debug, Clone)]
pub struct ApiKeyAuth(pub Option<String>);

impl FromRequestParts<Arc<AppState>> for ApiKeyAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|h| h.to_str().ok());

        match state.gate.validate(presented) {
            Ok(key) => Ok(ApiKeyAuth(key)),
            Err(e) => {
                warn!(
                    path = %parts.uri.path(),
                    key_present = presented.is_some(),
                    error = %e,
                    "API key rejected"
                );
                Err(ApiError(e))
            }
        }
    }
}
