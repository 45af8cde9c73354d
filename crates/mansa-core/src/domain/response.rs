//! 조회 결과를 외부 JSON 계약으로 변환.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::query::{QueryMode, TIME_COLUMN};
use super::range::DateRange;
use super::row::{ResultRow, Scalar};
use crate::error::{StocksError, StocksResult};

/// 응답에 그대로 돌려줄 요청 정보.
#[derive(Debug, Clone)]
pub struct RequestEcho {
    /// 원본 검색어
    pub search: String,
    /// 분리된 필드 목록 (요청 순서)
    pub fields: Vec<String>,
    /// 클라이언트가 보낸 형태 그대로의 범위 (1개 또는 2개 요소)
    pub range_input: Vec<String>,
    /// 정규화된 유효 범위
    pub range: DateRange,
}

/// historical/fundamental 응답 본문.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct StocksPayload {
    /// 검색어
    pub search: String,
    /// 요청 필드 목록
    pub fields: Vec<String>,
    /// 쿼리 모드
    #[serde(rename = "type")]
    pub mode: QueryMode,
    /// historical: 요청된 연도 (입력 형태 그대로)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<Vec<String>>,
    /// fundamental: 요청된 날짜 (입력 형태 그대로)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<Vec<String>>,
    /// 정규화된 유효 범위
    pub range: DateRange,
    /// 행 수
    pub count: usize,
    /// 결과 행 (컬럼 라벨 → 값)
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Vec<Object>))]
    pub data: Vec<ResultRow>,
}

/// 결과 행을 응답 본문으로 변환합니다.
///
/// fundamental 모드에서는 `TIME` 값을 ISO 날짜(`YYYY-MM-DD`)로 정규화합니다.
///
/// # Errors
///
/// 행이 없으면 검색어를 담은 `NotFound`.
pub fn shape(
    mut rows: Vec<ResultRow>,
    mode: QueryMode,
    echo: RequestEcho,
) -> StocksResult<StocksPayload> {
    if rows.is_empty() {
        return Err(StocksError::NotFound {
            search: echo.search,
        });
    }

    if mode == QueryMode::Fundamental {
        for row in &mut rows {
            if let Some(value) = row.get_mut(TIME_COLUMN) {
                normalize_time(value);
            }
        }
    }

    let (years, dates) = match mode {
        QueryMode::Historical => (Some(echo.range_input), None),
        QueryMode::Fundamental => (None, Some(echo.range_input)),
    };

    Ok(StocksPayload {
        search: echo.search,
        fields: echo.fields,
        mode,
        years,
        dates,
        range: echo.range,
        count: rows.len(),
        data: rows,
    })
}

/// TIME 값을 날짜로 정규화합니다. 해석할 수 없는 값은 그대로 둡니다.
fn normalize_time(value: &mut Scalar) {
    let date = match value {
        Scalar::Timestamp(ts) => Some(ts.date()),
        Scalar::Text(s) => parse_date_like(s),
        _ => None,
    };
    if let Some(date) = date {
        *value = Scalar::Date(date);
    }
}

fn parse_date_like(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|ts| ts.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|ts| ts.date())
        })
}
