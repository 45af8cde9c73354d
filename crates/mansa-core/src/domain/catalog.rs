//! 스키마 컬럼 허용 목록.
//!
//! 클라이언트가 요청한 필드를 SQL 식별자로 사용하기 전에
//! 실제 테이블에 존재하는 컬럼인지 확인합니다.

use std::collections::{HashMap, HashSet};

use super::query::{requested_columns, QueryMode, QueryRange};
use crate::error::{StocksError, StocksResult};

/// 모드별 테이블의 알려진 컬럼 집합.
///
/// 로드되지 않은 모드는 검사를 건너뜁니다.
#[derive(Debug, Clone, Default)]
pub struct ColumnCatalog {
    tables: HashMap<QueryMode, HashSet<String>>,
}

impl ColumnCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모드의 컬럼 목록을 등록합니다.
    pub fn with_columns<I, S>(mut self, mode: QueryMode, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .insert(mode, columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_loaded(&self, mode: QueryMode) -> bool {
        self.tables.contains_key(&mode)
    }

    pub fn column_count(&self, mode: QueryMode) -> usize {
        self.tables.get(&mode).map_or(0, HashSet::len)
    }

    /// 요청된 모든 동적 컬럼이 스키마에 존재하는지 확인합니다.
    ///
    /// # Errors
    ///
    /// 알 수 없는 컬럼이 하나라도 있으면 `BadRequest` (첫 번째 컬럼 이름 포함).
    pub fn check(&self, fields: &[String], range: &QueryRange) -> StocksResult<()> {
        let Some(known) = self.tables.get(&range.mode()) else {
            return Ok(());
        };

        match requested_columns(fields, range)
            .into_iter()
            .find(|column| !known.contains(column))
        {
            Some(unknown) => Err(StocksError::bad_request(format!("Unknown field: '{unknown}'"))),
            None => Ok(()),
        }
    }
}
