//! 인증.
//!
//! `X-API-Key` 헤더 기반 단일 공유 키 검증을 제공합니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(_key: ApiKeyAuth) -> impl IntoResponse {
//!     "secured"
//! }
//! ```

mod api_key;

pub use api_key::{ApiKeyAuth, API_KEY_HEADER};
