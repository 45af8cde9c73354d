//! 로깅 초기화. `[logging] format`으로 pretty/json/compact 중 하나를 고릅니다.

use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "mansa_api=debug")
    pub level: String,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::Pretty,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        let format = config.format.parse().unwrap_or_else(|e| {
            eprintln!("{e}, falling back to pretty");
            LogFormat::Pretty
        });
        LogConfig::new(config.level.clone()).with_format(format)
    }
}

/// 로깅 시스템을 초기화합니다. `RUST_LOG`가 있으면 설정 파일의 레벨보다 우선합니다.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let level = if config.level.trim().is_empty() {
        "info"
    } else {
        config.level.as_str()
    };
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?,
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init()?,
    }

    tracing::info!(format = ?config.format, level, "Logging initialized");
    Ok(())
}

/// 조회 요청 컨텍스트 필드가 포함된 span을 생성하는 매크로.
#[macro_export]
macro_rules! query_span {
    ($mode:expr, $search:expr) => {
        tracing::info_span!("stocks_query", mode = %$mode, search = %$search)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_config_from_logging_section() {
        let section = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
        };
        let config = LogConfig::from(&section);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);

        let fallback = LogConfig::from(&LoggingConfig {
            level: "info".to_string(),
            format: "xml".to_string(),
        });
        assert_eq!(fallback.format, LogFormat::Pretty);
    }
}
