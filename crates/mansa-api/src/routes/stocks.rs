//! 주식 데이터 조회 endpoint.
//!
//! # 엔드포인트
//!
//! - `GET /api/historical` - (필드, 연도) 컬럼 조회
//! - `GET /api/fundamental` - 날짜 범위 시계열 조회
//!
//! 두 엔드포인트 모두 `X-API-Key` 헤더가 필요합니다.
//!
//! 처리 순서: 키 검증 → 범위 파싱 → 필드 검사 → SQL 생성 → 실행 → 응답 변환.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use mansa_core::{
    parse_date_range, parse_year_range, query_span, shape, split_list, QueryMode, QueryRange,
    RequestEcho, StocksError, StocksPayload, StocksResult,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, Instrument};

use crate::auth::ApiKeyAuth;
use crate::error::ApiResult;
use crate::metrics::{query_outcome, record_rows_returned, record_stocks_query};
use crate::routes::key::key_check;
use crate::state::AppState;

/// historical 조회 파라미터.
#[derive(Debug, Default, Deserialize)]
pub struct HistoricalQuery {
    /// 티커 또는 회사명 일부
    #[serde(alias = "ticker")]
    pub search: Option<String>,
    /// 쉼표로 구분된 필드 목록
    pub fields: Option<String>,
    /// `YYYY` 또는 `YYYY,YYYY`
    pub years: Option<String>,
}

/// fundamental 조회 파라미터.
#[derive(Debug, Default, Deserialize)]
pub struct FundamentalQuery {
    /// 티커 또는 회사명 일부
    #[serde(alias = "ticker")]
    pub search: Option<String>,
    /// 쉼표로 구분된 필드 목록
    pub fields: Option<String>,
    /// `YYYY`, `YYYY-MM`, `YYYY-MM-DD` 또는 그 두 개를 쉼표로 연결
    pub dates: Option<String>,
}

/// 연도별 필드 값 조회.
///
/// GET /api/historical?search=PETR4&fields=DY,ROE&years=2020,2023
#[utoipa::path(
    get,
    path = "/api/historical",
    params(
        ("search" = String, Query, description = "티커 또는 회사명 일부 (별칭: ticker)"),
        ("fields" = String, Query, description = "쉼표로 구분된 필드 목록"),
        ("years" = String, Query, description = "연도 하나 또는 `시작,끝`"),
        ("X-API-Key" = Option<String>, Header, description = "API 키")
    ),
    responses(
        (status = 200, description = "조회 성공", body = StocksPayload),
        (status = 400, description = "잘못된 파라미터", body = crate::error::ApiErrorResponse),
        (status = 401, description = "키 없음 또는 불일치", body = crate::error::ApiErrorResponse),
        (status = 404, description = "결과 없음", body = crate::error::ApiErrorResponse),
        (status = 500, description = "저장소 오류", body = crate::error::ApiErrorResponse)
    ),
    tag = "stocks"
)]
pub async fn get_historical(
    _auth: ApiKeyAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoricalQuery>,
) -> ApiResult<Json<StocksPayload>> {
    let payload = run_query(
        &state,
        QueryMode::Historical,
        query.search,
        query.fields,
        query.years,
    )
    .await?;
    Ok(Json(payload))
}

/// 날짜 범위 시계열 조회.
///
/// GET /api/fundamental?search=PETR4&fields=DY,ROE&dates=2024
#[utoipa::path(
    get,
    path = "/api/fundamental",
    params(
        ("search" = String, Query, description = "티커 또는 회사명 일부 (별칭: ticker)"),
        ("fields" = String, Query, description = "쉼표로 구분된 필드 목록"),
        ("dates" = String, Query, description = "날짜 하나 또는 `시작,끝` (YYYY, YYYY-MM, YYYY-MM-DD)"),
        ("X-API-Key" = Option<String>, Header, description = "API 키")
    ),
    responses(
        (status = 200, description = "조회 성공", body = StocksPayload),
        (status = 400, description = "잘못된 파라미터", body = crate::error::ApiErrorResponse),
        (status = 401, description = "키 없음 또는 불일치", body = crate::error::ApiErrorResponse),
        (status = 404, description = "결과 없음", body = crate::error::ApiErrorResponse),
        (status = 500, description = "저장소 오류", body = crate::error::ApiErrorResponse)
    ),
    tag = "stocks"
)]
pub async fn get_fundamental(
    _auth: ApiKeyAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<FundamentalQuery>,
) -> ApiResult<Json<StocksPayload>> {
    let payload = run_query(
        &state,
        QueryMode::Fundamental,
        query.search,
        query.fields,
        query.dates,
    )
    .await?;
    Ok(Json(payload))
}

/// 공통 조회 흐름. 결과와 무관하게 조회 메트릭을 기록합니다.
async fn run_query(
    state: &AppState,
    mode: QueryMode,
    search: Option<String>,
    fields: Option<String>,
    range: Option<String>,
) -> StocksResult<StocksPayload> {
    let search = required(search, "search")?;
    let span = query_span!(mode, search);

    let result = execute(state, mode, search, fields, range)
        .instrument(span)
        .await;

    record_stocks_query(mode, query_outcome(&result));
    if let Ok(payload) = &result {
        record_rows_returned(mode, payload.count);
    }
    result
}

async fn execute(
    state: &AppState,
    mode: QueryMode,
    search: String,
    fields: Option<String>,
    range: Option<String>,
) -> StocksResult<StocksPayload> {
    let range_param = match mode {
        QueryMode::Historical => "years",
        QueryMode::Fundamental => "dates",
    };
    let fields = parse_fields(&required(fields, "fields")?)?;
    let raw_range = required(range, range_param)?;

    let range = match mode {
        QueryMode::Historical => {
            let years = parse_year_range(&raw_range)?;
            if years.span() > state.query.max_year_span {
                return Err(StocksError::bad_request(format!(
                    "Year range spans {} years, maximum is {}",
                    years.span(),
                    state.query.max_year_span
                )));
            }
            QueryRange::Historical(years)
        }
        QueryMode::Fundamental => QueryRange::Fundamental(parse_date_range(&raw_range)?),
    };

    if state.query.strict_fields {
        state.catalog.check(&fields, &range)?;
    }

    let query = state.builder.build(&search, &fields, &range)?;
    let rows = state.store.fetch_rows(&query).await?;

    info!(
        fields = fields.len(),
        columns = query.columns.len(),
        rows = rows.len(),
        "Stock query completed"
    );

    let echo = RequestEcho {
        search,
        fields,
        range_input: split_list(&raw_range),
        range: range.effective(),
    };
    shape(rows, mode, echo)
}

fn required(value: Option<String>, name: &str) -> StocksResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(StocksError::bad_request(format!(
            "Missing required parameter: {name}"
        ))),
    }
}

/// 쉼표로 구분된 필드 목록을 분리합니다. 빈 필드와 중복 필드는 허용하지 않습니다.
fn parse_fields(raw: &str) -> StocksResult<Vec<String>> {
    let fields = split_list(raw);
    if fields.iter().any(String::is_empty) {
        return Err(StocksError::bad_request("Field names must not be empty"));
    }

    let mut seen = HashSet::with_capacity(fields.len());
    if let Some(duplicate) = fields.iter().find(|field| !seen.insert(field.as_str())) {
        return Err(StocksError::bad_request(format!(
            "Duplicate field: '{duplicate}'"
        )));
    }
    Ok(fields)
}

/// `/api` 하위 라우터.
pub fn stocks_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/key", get(key_check))
        .route("/historical", get(get_historical))
        .route("/fundamental", get(get_fundamental))
}
