//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 `Arc`로 래핑되어 Axum의 State extractor를 통해 핸들러에 주입됩니다.
//! 요청 간에 변경되는 값은 없습니다.

use std::sync::Arc;

use mansa_core::{AccessGate, AppConfig, ColumnCatalog, QueryBuilder, QueryConfig};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::repository::StockStore;

/// 애플리케이션 공유 상태.
pub struct AppState {
    /// 쿼리 실행 저장소
    pub store: Arc<dyn StockStore>,

    /// API 키 검증기
    pub gate: AccessGate,

    /// SQL 생성기 (테이블 이름, 행 제한 포함)
    pub builder: QueryBuilder,

    /// 시작 시 적재된 컬럼 허용 목록
    pub catalog: ColumnCatalog,

    /// 쿼리 제한 설정
    pub query: QueryConfig,

    /// 서비스 이름 (헬스 체크 응답용)
    pub service_name: String,

    /// 설정된 리스닝 포트
    pub port: u16,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,

    /// Prometheus 렌더링 핸들 (설치된 경우에만 `/metrics` 노출)
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// 설정과 저장소로 상태를 생성합니다. 카탈로그는 비어 있는 상태로 시작합니다.
    pub fn new(config: &AppConfig, store: Arc<dyn StockStore>) -> Self {
        Self {
            store,
            gate: AccessGate::from_config(&config.api_key),
            builder: QueryBuilder::new(&config.tables.historical, &config.tables.fundamental)
                .with_row_limit(config.query.row_limit),
            catalog: ColumnCatalog::new(),
            query: config.query.clone(),
            service_name: config.server.name.clone(),
            port: config.server.port,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            metrics: None,
        }
    }

    pub fn with_catalog(mut self, catalog: ColumnCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn with_gate(mut self, gate: AccessGate) -> Self {
        self.gate = gate;
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        self.store.ping().await
    }
}

/// 테스트용 AppState 생성.
///
/// 키 검증이 꺼져 있고 행이 없는 메모리 저장소를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    create_test_state_with(crate::repository::MemoryStockStore::new())
}

/// 주어진 메모리 저장소로 테스트용 AppState 생성.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state_with(store: crate::repository::MemoryStockStore) -> AppState {
    AppState::new(&AppConfig::default(), Arc::new(store)).with_gate(AccessGate::disabled())
}
