//! 데이터베이스 저장소 계층.
//!
//! - [`StockStore`]: 쿼리 실행 추상화
//! - [`PgStockStore`]: sqlx/PostgreSQL 구현
//! - [`load_catalog`]: 시작 시 컬럼 허용 목록 적재

mod stocks;

#[cfg(any(test, feature = "test-utils"))]
mod memory;

pub use stocks::{connect_options, PgStockStore, StockStore};

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStockStore;

use mansa_core::{ColumnCatalog, QueryBuilder, QueryMode};
use tracing::{info, warn};

/// 두 테이블의 컬럼 목록을 읽어 [`ColumnCatalog`]를 만듭니다.
///
/// 읽지 못한 테이블은 카탈로그에서 빠지며 해당 모드의 필드 검사는 생략됩니다.
pub async fn load_catalog(store: &dyn StockStore, builder: &QueryBuilder) -> ColumnCatalog {
    let mut catalog = ColumnCatalog::new();

    for mode in [QueryMode::Historical, QueryMode::Fundamental] {
        let table = builder.table_for(mode);
        match store.load_columns(table).await {
            Ok(columns) if !columns.is_empty() => {
                info!(%mode, table, columns = columns.len(), "Column catalog loaded");
                catalog = catalog.with_columns(mode, columns);
            }
            Ok(_) => {
                warn!(%mode, table, "Table has no visible columns, field checks disabled");
            }
            Err(e) => {
                warn!(%mode, table, error = %e, "Column catalog unavailable, field checks disabled");
            }
        }
    }

    catalog
}
