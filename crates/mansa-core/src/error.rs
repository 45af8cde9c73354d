//! 주식 조회 서비스의 에러 타입.
//!
//! 요청 처리 체인 전체가 이 모듈의 [`StocksError`]를 반환하며,
//! HTTP 계층의 단일 어댑터가 이를 응답 상태 코드로 변환합니다.

use thiserror::Error;

/// 주식 조회 에러.
#[derive(Debug, Error)]
pub enum StocksError {
    /// API 키가 없거나 일치하지 않음
    #[error("Invalid or missing API key")]
    Unauthorized,

    /// 서버 설정 에러 (API 키 강제 모드인데 키가 설정되지 않음 등)
    #[error("{0}")]
    Configuration(String),

    /// 잘못된 요청 (범위 형식, 목록 개수, 알 수 없는 필드 등)
    #[error("{0}")]
    BadRequest(String),

    /// 쿼리는 성공했지만 결과 행이 없음
    #[error("No data found for '{search}'")]
    NotFound {
        /// 클라이언트가 보낸 원본 검색어
        search: String,
    },

    /// 저장소 연결/실행 실패
    #[error("{0}")]
    Store(String),
}

/// 주식 조회 작업을 위한 Result 타입.
pub type StocksResult<T> = Result<T, StocksError>;

impl StocksError {
    /// BadRequest 에러를 생성합니다.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_keeps_message() {
        let err = StocksError::bad_request("Invalid year: '20x4'");
        assert!(matches!(&err, StocksError::BadRequest(msg) if msg.contains("20x4")));
        assert_eq!(err.to_string(), "Invalid year: '20x4'");
    }

    #[test]
    fn test_not_found_message_carries_search() {
        let err = StocksError::NotFound {
            search: "VALE3".to_string(),
        };
        assert_eq!(err.to_string(), "No data found for 'VALE3'");
    }
}
