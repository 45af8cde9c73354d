//! 테스트용 메모리 저장소.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mansa_core::{BuiltQuery, ResultRow, StocksError, StocksResult};

use super::StockStore;

/// 고정된 행을 돌려주고 실행된 쿼리를 기록하는 [`StockStore`].
#[derive(Default)]
pub struct MemoryStockStore {
    rows: Vec<ResultRow>,
    columns: HashMap<String, Vec<String>>,
    failing: bool,
    executed: Mutex<Vec<BuiltQuery>>,
}

impl MemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, rows: Vec<ResultRow>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_table<I, S>(mut self, table: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.insert(
            table.to_string(),
            columns.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// 모든 호출이 `Store` 에러로 실패하도록 설정합니다.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// 지금까지 실행된 쿼리.
    pub fn executed(&self) -> Vec<BuiltQuery> {
        self.executed
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StockStore for MemoryStockStore {
    async fn fetch_rows(&self, query: &BuiltQuery) -> StocksResult<Vec<ResultRow>> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(query.clone());
        }
        if self.failing {
            return Err(StocksError::Store(
                "Failed to query the stock database".to_string(),
            ));
        }
        Ok(self.rows.clone())
    }

    async fn load_columns(&self, table: &str) -> StocksResult<Vec<String>> {
        if self.failing {
            return Err(StocksError::Store(
                "Failed to query the stock database".to_string(),
            ));
        }
        Ok(self.columns.get(table).cloned().unwrap_or_default())
    }

    async fn ping(&self) -> bool {
        !self.failing
    }
}
