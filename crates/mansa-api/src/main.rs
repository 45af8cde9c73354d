//! Mansa Stocks API 서버 바이너리.
//!
//! 설정 로드 → 로깅 → 메트릭 → DB 풀 → 컬럼 카탈로그 → 서버 시작 순으로 초기화합니다.

use std::sync::Arc;

use anyhow::Context;
use mansa_api::{load_catalog, setup_metrics_recorder, start, AppState, PgStockStore};
use mansa_core::{init_logging, AppConfig, LogConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let mut config = AppConfig::load_default().context("Failed to load configuration")?;
    if config.database.url.is_none() {
        config.database.url = std::env::var("DATABASE_URL").ok();
    }

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    info!(
        service = %config.server.name,
        api_key_enforced = config.api_key.is_enforced(),
        "Starting Mansa Stocks API..."
    );
    if config.api_key.is_enforced() && config.api_key.key.is_none() {
        warn!("API key enforcement is on but no key is configured; /api requests will fail");
    }

    let metrics_handle =
        setup_metrics_recorder().context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");

    let store = PgStockStore::connect_lazy(&config.database)
        .context("Invalid database configuration")?;
    let store = Arc::new(store);

    let mut state = AppState::new(&config, store.clone()).with_metrics(metrics_handle);
    if config.query.strict_fields {
        let catalog = load_catalog(store.as_ref(), &state.builder).await;
        state = state.with_catalog(catalog);
    }

    let handle = start(&config.server, Arc::new(state)).await?;
    info!(
        "Metrics available at http://{}/metrics",
        handle.local_addr()
    );

    let token = handle.shutdown_token();
    tokio::select! {
        _ = shutdown_signal() => {
            token.cancel();
        }
        _ = token.cancelled() => {}
    }

    handle.wait().await?;
    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
