//! 주식 데이터 저장소 (QueryExecutor).
//!
//! [`BuiltQuery`]를 PostgreSQL에 실행하고 각 행을 [`ResultRow`]로 디코딩합니다.
//! 호출마다 풀에서 연결 하나를 빌리고, 어떤 경로로 끝나든 drop 시 반환됩니다.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mansa_core::{
    BindValue, BuiltQuery, DatabaseConfig, ResultRow, Scalar, StocksError, StocksResult,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row, TypeInfo};
use tracing::{debug, error, warn};

/// 주식 데이터 저장소 추상화.
///
/// 라우트 핸들러는 이 trait만 의존하므로 테스트에서는 메모리 구현으로 대체할 수 있습니다.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// 쿼리를 실행하고 결과 행을 반환합니다.
    async fn fetch_rows(&self, query: &BuiltQuery) -> StocksResult<Vec<ResultRow>>;

    /// 테이블의 컬럼 이름 목록을 조회합니다.
    async fn load_columns(&self, table: &str) -> StocksResult<Vec<String>>;

    /// 저장소 연결 상태.
    async fn ping(&self) -> bool;
}

/// `DatabaseConfig`로부터 연결 옵션을 생성합니다.
///
/// `url`이 있으면 그대로 사용하고, 없으면 개별 필드로 조합합니다.
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, sqlx::Error> {
    if let Some(url) = config.url.as_deref().filter(|u| !u.is_empty()) {
        return PgConnectOptions::from_str(url);
    }

    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.name);
    if !config.password.is_empty() {
        options = options.password(&config.password);
    }
    Ok(options)
}

/// PostgreSQL 기반 [`StockStore`].
#[derive(Clone)]
pub struct PgStockStore {
    pool: PgPool,
}

impl PgStockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 설정으로 연결 풀을 만듭니다.
    ///
    /// 연결은 첫 사용 시점에 맺어지므로 DB가 내려가 있어도 서버는 기동됩니다.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.connection_timeout_secs,
            ))
            .connect_lazy_with(connect_options(config)?);
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StockStore for PgStockStore {
    async fn fetch_rows(&self, query: &BuiltQuery) -> StocksResult<Vec<ResultRow>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| store_error("acquire connection", e))?;

        let mut q = sqlx::query(&query.sql);
        for param in &query.params {
            q = match &param.value {
                BindValue::Text(value) => q.bind(value.as_str()),
                BindValue::Integer(value) => q.bind(*value),
            };
        }

        let rows = q
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| store_error("fetch rows", e))?;

        debug!(mode = %query.mode, rows = rows.len(), "Stock query executed");

        Ok(rows.iter().map(decode_row).collect())
    }

    async fn load_columns(&self, table: &str) -> StocksResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT column_name::text
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("load columns", e))
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

fn store_error(operation: &str, err: sqlx::Error) -> StocksError {
    error!(operation, error = %err, "Stock store failure");
    StocksError::Store("Failed to query the stock database".to_string())
}

fn decode_row(row: &PgRow) -> ResultRow {
    let mut out = ResultRow::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        out.insert(
            column.name(),
            decode_cell(row, idx, column.type_info().name()),
        );
    }
    out
}

/// Postgres 타입 이름에 따라 셀을 [`Scalar`]로 변환합니다.
fn decode_cell(row: &PgRow, idx: usize, type_name: &str) -> Scalar {
    let decoded: Result<Scalar, sqlx::Error> = match type_name {
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(idx).map(Scalar::from)
        }
        "INT2" => row
            .try_get::<Option<i16>, _>(idx)
            .map(|v| Scalar::from(v.map(i64::from))),
        "INT4" => row
            .try_get::<Option<i32>, _>(idx)
            .map(|v| Scalar::from(v.map(i64::from))),
        "INT8" => row.try_get::<Option<i64>, _>(idx).map(Scalar::from),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(idx)
            .map(|v| Scalar::from(v.map(f64::from))),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx).map(Scalar::from),
        "NUMERIC" => row
            .try_get::<Option<Decimal>, _>(idx)
            .map(|v| Scalar::from(v.and_then(|d| d.to_f64()))),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx).map(Scalar::from),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)
            .map(Scalar::from),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)
            .map(|v| Scalar::from(v.map(|t| t.naive_utc()))),
        "BOOL" => row
            .try_get::<Option<bool>, _>(idx)
            .map(|v| Scalar::from(v.map(|b| b.to_string()))),
        _ => row.try_get::<Option<String>, _>(idx).map(Scalar::from),
    };

    decoded.unwrap_or_else(|e| {
        warn!(column = idx, type_name, error = %e, "Undecodable column value, returning null");
        Scalar::Null
    })
}
