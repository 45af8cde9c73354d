//! 연도/날짜 범위 정규화.
//!
//! 클라이언트가 보낸 `years`, `dates`, `fields` 쿼리 파라미터를 해석합니다.
//!
//! # 날짜 입력 단위
//!
//! | 입력 | 결과 |
//! |------|------|
//! | `2024` | `2024-01-01` ~ `2024-12-31` |
//! | `2024-02` | `2024-02-01` ~ `2024-02-29` |
//! | `2024-02-15` | `2024-02-15` ~ `2024-02-15` |
//! | `2020-01-01,2024-12-31` | 첫 요소 시작, 둘째 요소 종료 (확장 없음) |

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{StocksError, StocksResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

const DATES_FORMAT_HINT: &str =
    "Expected 1 or 2 comma-separated dates, e.g. dates=2024 or dates=2020-01-01,2024-12-31";

/// 허용하는 연도 범위 (`YYYY` 네 자리).
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

const YEARS_FORMAT_HINT: &str =
    "Expected 1 or 2 comma-separated years, e.g. years=2024 or years=2020,2024";

/// `BETWEEN` 비교에 사용할 날짜 범위 (양 끝 포함).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct DateRange {
    /// 시작일 (YYYY-MM-DD)
    pub start: String,
    /// 종료일 (YYYY-MM-DD)
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// historical 모드에서 사용하는 연도 범위 (양 끝 포함).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// 범위에 포함된 연도를 오름차순으로 반환합니다.
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    /// 범위에 포함된 연도 수.
    pub fn span(&self) -> usize {
        let span = i64::from(self.end) - i64::from(self.start) + 1;
        usize::try_from(span).unwrap_or(0)
    }

    /// 응답에 돌려줄 문자열 형태의 범위.
    pub fn to_date_range(&self) -> DateRange {
        DateRange::new(self.start.to_string(), self.end.to_string())
    }
}

/// 쉼표로 구분된 목록을 분리합니다.
///
/// 각 요소의 앞뒤 공백만 제거하며, 빈 요소도 그대로 유지합니다.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

/// 단일 날짜 표현을 `[start, end]` 범위로 확장합니다.
///
/// - 4글자 (`YYYY`): 해당 연도 전체
/// - 7글자 (`YYYY-MM`): 해당 월 전체 (윤년 반영)
/// - 그 외: 입력값을 시작/종료 모두로 사용
///
/// # Errors
///
/// `YYYY-MM` 형태인데 실제 월로 해석할 수 없으면 `BadRequest`.
pub fn parse_range(raw: &str) -> StocksResult<DateRange> {
    match raw.chars().count() {
        4 => Ok(DateRange::new(format!("{raw}-01-01"), format!("{raw}-12-31"))),
        7 => {
            let last_day = last_day_of_month(raw)?;
            Ok(DateRange::new(
                format!("{raw}-01"),
                format!("{raw}-{last_day:02}"),
            ))
        }
        _ => Ok(DateRange::new(raw, raw)),
    }
}

/// `YYYY-MM`의 마지막 날짜를 계산합니다.
fn last_day_of_month(year_month: &str) -> StocksResult<u32> {
    let invalid = || StocksError::bad_request(format!("Invalid year-month: '{year_month}'"));

    let (year, month) = year_month.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    next_month
        .and_then(|d| d.pred_opt())
        .map(|last| last.day())
        .ok_or_else(invalid)
}

/// `dates` 파라미터를 날짜 범위로 변환합니다.
///
/// 요소가 1개면 [`parse_range`]로 확장하고, 2개면 첫 요소를 시작,
/// 둘째 요소를 종료로 그대로 사용합니다.
///
/// # Errors
///
/// - 요소 개수가 1 또는 2가 아님
/// - 확장된 경계가 `YYYY-MM-DD` 날짜가 아님
/// - 시작일이 종료일보다 늦음
pub fn parse_date_range(raw: &str) -> StocksResult<DateRange> {
    let parts = split_list(raw);
    let range = match parts.as_slice() {
        [single] => parse_range(single)?,
        [start, end] => DateRange::new(start.as_str(), end.as_str()),
        _ => return Err(StocksError::bad_request(DATES_FORMAT_HINT)),
    };

    let start = parse_iso_date(&range.start)?;
    let end = parse_iso_date(&range.end)?;
    if start > end {
        return Err(StocksError::bad_request(format!(
            "Invalid date range: start {} is after end {}",
            range.start, range.end
        )));
    }

    Ok(range)
}

/// `years` 파라미터를 연도 범위로 변환합니다.
///
/// 요소가 1개면 `(y, y)`, 2개면 `(y0, y1)`입니다.
///
/// # Errors
///
/// - 요소 개수가 1 또는 2가 아님
/// - 요소가 `1..=9999` 범위의 정수 연도가 아님
/// - 시작 연도가 종료 연도보다 큼
pub fn parse_year_range(raw: &str) -> StocksResult<YearRange> {
    let parts = split_list(raw);
    let (start, end) = match parts.as_slice() {
        [single] => (parse_year(single)?, parse_year(single)?),
        [start, end] => (parse_year(start)?, parse_year(end)?),
        _ => return Err(StocksError::bad_request(YEARS_FORMAT_HINT)),
    };

    if start > end {
        return Err(StocksError::bad_request(format!(
            "Invalid year range: start {start} is after end {end}"
        )));
    }

    Ok(YearRange::new(start, end))
}

fn parse_year(raw: &str) -> StocksResult<i32> {
    raw.parse::<i32>()
        .ok()
        .filter(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
        .ok_or_else(|| StocksError::bad_request(format!("Invalid year: '{raw}'")))
}

fn parse_iso_date(raw: &str) -> StocksResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        StocksError::bad_request(format!("Invalid date: '{raw}' (expected YYYY-MM-DD)"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_list_trims_and_keeps_empty() {
        assert_eq!(split_list("DY, ROE ,LUCRO LIQUIDO"), vec!["DY", "ROE", "LUCRO LIQUIDO"]);
        assert_eq!(split_list("DY,,ROE"), vec!["DY", "", "ROE"]);
        assert_eq!(split_list(""), vec![""]);
    }

    #[test]
    fn test_parse_range_year() {
        let range = parse_range("2024").unwrap();
        assert_eq!(range, DateRange::new("2024-01-01", "2024-12-31"));
    }

    #[test]
    fn test_parse_range_year_month_leap() {
        assert_eq!(parse_range("2024-02").unwrap().end, "2024-02-29");
        assert_eq!(parse_range("2023-02").unwrap().end, "2023-02-28");
        assert_eq!(parse_range("1900-02").unwrap().end, "1900-02-28");
        assert_eq!(parse_range("2000-02").unwrap().end, "2000-02-29");
    }

    #[test]
    fn test_parse_range_year_month_bounds() {
        let range = parse_range("2023-12").unwrap();
        assert_eq!(range, DateRange::new("2023-12-01", "2023-12-31"));

        let range = parse_range("2023-04").unwrap();
        assert_eq!(range, DateRange::new("2023-04-01", "2023-04-30"));
    }

    #[test]
    fn test_parse_range_invalid_month() {
        assert!(matches!(parse_range("2024-13"), Err(StocksError::BadRequest(_))));
        assert!(matches!(parse_range("2024/02"), Err(StocksError::BadRequest(_))));
    }

    #[test]
    fn test_parse_range_exact_date_passthrough() {
        let range = parse_range("2024-03-15").unwrap();
        assert_eq!(range, DateRange::new("2024-03-15", "2024-03-15"));
    }

    #[test]
    fn test_parse_date_range_pair_is_not_expanded() {
        let range = parse_date_range("2020-01-01, 2024-12-31").unwrap();
        assert_eq!(range, DateRange::new("2020-01-01", "2024-12-31"));
    }

    #[test]
    fn test_parse_date_range_rejects_bad_cardinality() {
        for raw in ["2020,2021,2022", "2020-01-01,2021-01-01,2022-01-01,2023-01-01"] {
            assert!(matches!(parse_date_range(raw), Err(StocksError::BadRequest(_))));
        }
    }

    #[test]
    fn test_parse_date_range_rejects_inverted_bounds() {
        let err = parse_date_range("2024-12-31,2020-01-01").unwrap_err();
        assert!(matches!(err, StocksError::BadRequest(_)));
    }

    #[test]
    fn test_parse_date_range_rejects_garbage() {
        assert!(parse_date_range("abcd").is_err());
        assert!(parse_date_range("yesterday").is_err());
        assert!(parse_date_range("").is_err());
        assert!(matches!(parse_date_range("2020,2024"), Err(StocksError::BadRequest(_))));
    }

    #[test]
    fn test_parse_year_range() {
        assert_eq!(parse_year_range("2024").unwrap(), YearRange::new(2024, 2024));
        assert_eq!(parse_year_range("2020, 2024").unwrap(), YearRange::new(2020, 2024));
    }

    #[test]
    fn test_parse_year_range_errors() {
        assert!(matches!(parse_year_range("2020,2021,2022"), Err(StocksError::BadRequest(_))));
        assert!(matches!(parse_year_range("2024,2020"), Err(StocksError::BadRequest(_))));
        assert!(matches!(parse_year_range("20x4"), Err(StocksError::BadRequest(_))));
        assert!(matches!(parse_year_range(""), Err(StocksError::BadRequest(_))));
    }

    #[test]
    fn test_parse_year_range_rejects_out_of_range_years() {
        for raw in ["-2147483648,2147483647", "0,2024", "2024,10000", "-1"] {
            assert!(
                matches!(parse_year_range(raw), Err(StocksError::BadRequest(_))),
                "{raw}"
            );
        }
        assert_eq!(parse_year_range("1,9999").unwrap().span(), 9999);
    }

    #[test]
    fn test_year_span_does_not_overflow() {
        assert_eq!(YearRange::new(i32::MIN, i32::MAX).span() as u64, 1u64 << 32);
        assert_eq!(YearRange::new(2024, 2020).span(), 0);
    }

    #[test]
    fn test_year_range_iteration() {
        let range = YearRange::new(2020, 2022);
        assert_eq!(range.years().collect::<Vec<_>>(), vec![2020, 2021, 2022]);
        assert_eq!(range.span(), 3);
        assert_eq!(range.to_date_range(), DateRange::new("2020", "2022"));
    }

    proptest! {
        #[test]
        fn prop_year_expands_to_full_year(year in 1000u32..=9999) {
            let raw = year.to_string();
            let range = parse_range(&raw).unwrap();
            prop_assert_eq!(range.start, format!("{raw}-01-01"));
            prop_assert_eq!(range.end, format!("{raw}-12-31"));
        }

        #[test]
        fn prop_year_month_ends_on_last_calendar_day(year in 1000i32..=9998, month in 1u32..=12) {
            let raw = format!("{year:04}-{month:02}");
            let range = parse_range(&raw).unwrap();

            let end = NaiveDate::parse_from_str(&range.end, DATE_FORMAT).unwrap();
            prop_assert_eq!(end.month(), month);
            // 마지막 날의 다음 날은 다음 달 1일
            prop_assert_eq!(end.succ_opt().unwrap().day(), 1);
            prop_assert_eq!(range.start, format!("{raw}-01"));
        }

        #[test]
        fn prop_too_many_elements_is_bad_request(n in 3usize..8) {
            let raw = vec!["2020"; n].join(",");
            prop_assert!(matches!(parse_year_range(&raw), Err(StocksError::BadRequest(_))));
            prop_assert!(matches!(parse_date_range(&raw), Err(StocksError::BadRequest(_))));
        }
    }
}
