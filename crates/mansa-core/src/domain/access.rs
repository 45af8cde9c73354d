//! API 키 검증.

use secrecy::{ExposeSecret, SecretString};

use crate::config::ApiKeyConfig;
use crate::error::{StocksError, StocksResult};

/// 단일 공유 비밀 키 검증기.
#[derive(Debug)]
pub struct AccessGate {
    enforced: bool,
    key: Option<SecretString>,
}

impl AccessGate {
    /// 검증기를 생성합니다. 빈 문자열 키는 미설정으로 취급합니다.
    pub fn new(enforced: bool, key: Option<String>) -> Self {
        let key = key
            .filter(|k| !k.is_empty())
            .map(|k| SecretString::new(k.into_boxed_str()));
        Self { enforced, key }
    }

    /// 키 검증을 하지 않는 검증기.
    pub fn disabled() -> Self {
        Self::new(false, None)
    }

    pub fn from_config(config: &ApiKeyConfig) -> Self {
        Self::new(config.is_enforced(), config.key.clone())
    }

    pub fn is_enforced(&self) -> bool {
        self.enforced
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// 제시된 키를 검증합니다.
    ///
    /// 키 검증이 꺼져 있으면 항상 성공하며 `None`을 반환합니다.
    /// 성공 시 수락된 키를 돌려줍니다.
    ///
    /// # Errors
    ///
    /// - 강제 모드인데 서버에 키가 없음: `Configuration`
    /// - 키가 없거나 일치하지 않음: `Unauthorized`
    pub fn validate(&self, presented: Option<&str>) -> StocksResult<Option<String>> {
        if !self.enforced {
            return Ok(None);
        }

        let Some(expected) = &self.key else {
            return Err(StocksError::Configuration(
                "API key not configured".to_string(),
            ));
        };

        match presented {
            Some(key) if key == expected.expose_secret() => Ok(Some(key.to_string())),
            _ => Err(StocksError::Unauthorized),
        }
    }
}
