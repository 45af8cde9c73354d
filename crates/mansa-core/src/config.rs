//! 설정 관리.
//!
//! 기본값 → 설정 파일(선택) → 환경 변수 순서로 설정을 병합합니다.
//! 환경 변수는 `MANSA__` 접두사와 `__` 구분자를 사용합니다
//! (예: `MANSA__SERVER__PORT=3200`, `MANSA__API_KEY__SYSTEM=FALSE`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::domain::DEFAULT_ROW_LIMIT;

/// 기본 설정 파일 경로
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// API 키 검증을 끄는 `KEY.SYSTEM` 값
pub const KEY_SYSTEM_DISABLED: &str = "FALSE";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// API 키 설정
    #[serde(default)]
    pub api_key: ApiKeyConfig,
    /// 조회 대상 테이블
    #[serde(default)]
    pub tables: TablesConfig,
    /// 쿼리 제한
    #[serde(default)]
    pub query: QueryConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 서비스 이름 (헬스 체크 응답에 포함)
    pub name: String,
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 전체 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Mansa".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3200,
            request_timeout_secs: 30,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 전체 연결 URL. 설정되면 개별 항목보다 우선합니다.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// 데이터베이스 이름
    pub name: String,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "stocks".to_string(),
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("connection_timeout_secs", &self.connection_timeout_secs)
            .finish()
    }
}

/// API 키 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiKeyConfig {
    /// `KEY.SYSTEM` 토글. 정확히 `"FALSE"`이면 키 검증을 하지 않습니다.
    pub system: String,
    /// 기대하는 API 키
    pub key: Option<String>,
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            system: "TRUE".to_string(),
            key: None,
        }
    }
}

impl ApiKeyConfig {
    /// API 키 검증 여부.
    pub fn is_enforced(&self) -> bool {
        self.system != KEY_SYSTEM_DISABLED
    }
}

impl fmt::Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("system", &self.system)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// 조회 대상 테이블 이름.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TablesConfig {
    /// (필드, 연도) 컬럼을 가진 테이블
    pub historical: String,
    /// TIME 시계열 테이블
    pub fundamental: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            historical: "historical".to_string(),
            fundamental: "fundamental".to_string(),
        }
    }
}

/// 쿼리 제한 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// 최대 반환 행 수
    pub row_limit: i64,
    /// historical 요청에서 허용하는 최대 연도 수
    pub max_year_span: usize,
    /// 스키마에 없는 필드를 거부할지 여부
    pub strict_fields: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            row_limit: DEFAULT_ROW_LIMIT,
            max_year_span: 50,
            strict_fields: true,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다. 파일은 없어도 됩니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            // try_parsing 금지: "FALSE"가 bool false로 바뀜
            .add_source(config::Environment::with_prefix("MANSA").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// TOML 문자열에서 설정을 로드합니다.
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
