//! 파라미터 바인딩 SQL 쿼리 생성.
//!
//! 검색어, 필드 목록, 정규화된 범위를 받아 하나의 SQL 문과
//! 순서가 있는 바인딩 파라미터 목록을 만듭니다.
//!
//! # 안전성 규칙
//!
//! - 사용자 값(검색어, 날짜, 행 제한)은 항상 `$n` 바인딩 파라미터로 전달
//! - 컬럼/테이블 이름은 값이 아닌 따옴표 식별자(`"name"`)로 렌더링
//!
//! # 생성 예시 (fundamental)
//!
//! ```sql
//! SELECT "TICKER", "NOME", "TIME", "DY" FROM "fundamental"
//! WHERE (UPPER("TICKER") = UPPER($1) OR UPPER("NOME") LIKE UPPER($2) ESCAPE '\')
//!   AND DATE("TIME") BETWEEN CAST($3 AS DATE) AND CAST($4 AS DATE)
//! ORDER BY "TIME" DESC LIMIT $5
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::range::{DateRange, YearRange};
use crate::error::{StocksError, StocksResult};

/// 티커 컬럼
pub const TICKER_COLUMN: &str = "TICKER";
/// 회사명 컬럼
pub const NAME_COLUMN: &str = "NOME";
/// fundamental 시계열 컬럼
pub const TIME_COLUMN: &str = "TIME";

/// 기본 최대 반환 행 수
pub const DEFAULT_ROW_LIMIT: i64 = 1000;

/// 쿼리 모드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// (필드, 연도) 조합마다 한 컬럼
    Historical,
    /// TIME 컬럼 기준 날짜 범위 필터
    Fundamental,
}

impl QueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Historical => "historical",
            QueryMode::Fundamental => "fundamental",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 모드별로 정규화된 조회 범위.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRange {
    /// historical: 포함 연도 범위
    Historical(YearRange),
    /// fundamental: 포함 날짜 범위
    Fundamental(DateRange),
}

impl QueryRange {
    pub fn mode(&self) -> QueryMode {
        match self {
            QueryRange::Historical(_) => QueryMode::Historical,
            QueryRange::Fundamental(_) => QueryMode::Fundamental,
        }
    }

    /// 응답에 돌려줄 유효 범위.
    pub fn effective(&self) -> DateRange {
        match self {
            QueryRange::Historical(years) => years.to_date_range(),
            QueryRange::Fundamental(dates) => dates.clone(),
        }
    }
}

/// 바인딩 값.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Integer(i64),
}

/// 이름이 붙은 바인딩 파라미터. 목록에서의 위치 `i`가 `$i+1`에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParam {
    pub name: &'static str,
    pub value: BindValue,
}

/// 생성된 쿼리.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    /// `$n` placeholder를 사용하는 SQL 템플릿
    pub sql: String,
    /// placeholder 순서대로 정렬된 바인딩 파라미터
    pub params: Vec<BoundParam>,
    /// SELECT 절의 컬럼 라벨 (따옴표 제외, 선택 순서)
    pub columns: Vec<String>,
    pub mode: QueryMode,
}

impl BuiltQuery {
    /// 이름으로 바인딩 값을 조회합니다.
    pub fn param(&self, name: &str) -> Option<&BindValue> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

/// SQL 텍스트와 placeholder 번호를 함께 관리하는 작성기.
struct SqlWriter {
    sql: String,
    params: Vec<BoundParam>,
}

impl SqlWriter {
    fn new() -> Self {
        Self {
            sql: String::with_capacity(256),
            params: Vec::new(),
        }
    }

    fn push(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    fn push_bind(&mut self, name: &'static str, value: BindValue) -> &mut Self {
        self.params.push(BoundParam { name, value });
        self.sql.push('$');
        self.sql.push_str(&self.params.len().to_string());
        self
    }
}

/// SQL 식별자를 큰따옴표로 감쌉니다.
///
/// 내부의 `"`는 `""`로 이스케이프합니다.
///
/// # Errors
///
/// 빈 이름이나 NUL 문자가 포함된 이름은 `BadRequest`.
pub fn quote_identifier(name: &str) -> StocksResult<String> {
    if name.is_empty() {
        return Err(StocksError::bad_request("Empty field name"));
    }
    if name.contains('\0') {
        return Err(StocksError::bad_request(format!(
            "Invalid field name: {:?}",
            name
        )));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// LIKE 패턴의 메타 문자(`\`, `%`, `_`)를 이스케이프합니다.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// historical 컬럼 이름: `"{field} {year}"`.
pub fn historical_column(field: &str, year: i32) -> String {
    format!("{field} {year}")
}

/// 요청된 필드/범위에 대해 선택될 동적 컬럼 이름 목록 (기본 컬럼 제외).
///
/// historical은 필드 우선 순서입니다: 필드 1의 모든 연도, 필드 2의 모든 연도, ...
pub fn requested_columns(fields: &[String], range: &QueryRange) -> Vec<String> {
    match range {
        QueryRange::Historical(years) => fields
            .iter()
            .flat_map(|field| years.years().map(move |year| historical_column(field, year)))
            .collect(),
        QueryRange::Fundamental(_) => fields.to_vec(),
    }
}

/// 쿼리 생성기.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    historical_table: String,
    fundamental_table: String,
    row_limit: i64,
}

impl QueryBuilder {
    pub fn new(historical_table: impl Into<String>, fundamental_table: impl Into<String>) -> Self {
        Self {
            historical_table: historical_table.into(),
            fundamental_table: fundamental_table.into(),
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }

    /// 최대 반환 행 수를 설정합니다.
    pub fn with_row_limit(mut self, row_limit: i64) -> Self {
        self.row_limit = row_limit;
        self
    }

    pub fn row_limit(&self) -> i64 {
        self.row_limit
    }

    /// 모드에 해당하는 테이블 이름.
    pub fn table_for(&self, mode: QueryMode) -> &str {
        match mode {
            QueryMode::Historical => &self.historical_table,
            QueryMode::Fundamental => &self.fundamental_table,
        }
    }

    /// 쿼리를 생성합니다.
    ///
    /// # Errors
    ///
    /// 컬럼/테이블 이름을 식별자로 만들 수 없으면 `BadRequest`.
    pub fn build(
        &self,
        search: &str,
        fields: &[String],
        range: &QueryRange,
    ) -> StocksResult<BuiltQuery> {
        let mode = range.mode();

        let mut columns = vec![TICKER_COLUMN.to_string(), NAME_COLUMN.to_string()];
        if mode == QueryMode::Fundamental {
            columns.push(TIME_COLUMN.to_string());
        }
        columns.extend(requested_columns(fields, range));

        let select_list = columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<StocksResult<Vec<_>>>()?
            .join(", ");
        let table = quote_identifier(self.table_for(mode))?;

        let mut w = SqlWriter::new();
        w.push("SELECT ")
            .push(&select_list)
            .push(" FROM ")
            .push(&table)
            .push(" WHERE (UPPER(\"TICKER\") = UPPER(")
            .push_bind("search", BindValue::Text(search.to_string()))
            .push(") OR UPPER(\"NOME\") LIKE UPPER(")
            .push_bind(
                "search_pattern",
                BindValue::Text(format!("%{}%", escape_like(search))),
            )
            .push(") ESCAPE '\\')");

        if let QueryRange::Fundamental(dates) = range {
            w.push(" AND DATE(\"TIME\") BETWEEN CAST(")
                .push_bind("date_start", BindValue::Text(dates.start.clone()))
                .push(" AS DATE) AND CAST(")
                .push_bind("date_end", BindValue::Text(dates.end.clone()))
                .push(" AS DATE)")
                .push(" ORDER BY \"TIME\" DESC");
        }

        w.push(" LIMIT ")
            .push_bind("limit", BindValue::Integer(self.row_limit));

        Ok(BuiltQuery {
            sql: w.sql,
            params: w.params,
            columns,
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> QueryBuilder {
        QueryBuilder::new("historical", "fundamental")
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_historical_columns_are_field_major() {
        let range = QueryRange::Historical(YearRange::new(2020, 2021));
        let query = builder().build("PETR4", &fields(&["DY", "ROE"]), &range).unwrap();

        assert_eq!(
            query.columns,
            vec!["TICKER", "NOME", "DY 2020", "DY 2021", "ROE 2020", "ROE 2021"]
        );
        assert!(query
            .sql
            .starts_with(r#"SELECT "TICKER", "NOME", "DY 2020", "DY 2021", "ROE 2020", "ROE 2021" FROM "historical""#));
    }

    #[test]
    fn test_historical_has_no_date_predicate_or_time_order() {
        let range = QueryRange::Historical(YearRange::new(2022, 2023));
        let query = builder().build("PETR4", &fields(&["DY"]), &range).unwrap();

        assert_eq!(query.columns, vec!["TICKER", "NOME", "DY 2022", "DY 2023"]);
        assert!(!query.sql.contains("BETWEEN"));
        assert!(!query.sql.contains("ORDER BY"));
        assert!(query.param("date_start").is_none());
        assert_eq!(query.mode, QueryMode::Historical);
    }

    #[test]
    fn test_fundamental_query_shape() {
        let range = QueryRange::Fundamental(DateRange::new("2024-01-01", "2024-12-31"));
        let query = builder()
            .build("PETR4", &fields(&["DY", "ROE"]), &range)
            .unwrap();

        assert_eq!(query.columns, vec!["TICKER", "NOME", "TIME", "DY", "ROE"]);
        assert_eq!(
            query.sql,
            "SELECT \"TICKER\", \"NOME\", \"TIME\", \"DY\", \"ROE\" FROM \"fundamental\" \
             WHERE (UPPER(\"TICKER\") = UPPER($1) OR UPPER(\"NOME\") LIKE UPPER($2) ESCAPE '\\') \
             AND DATE(\"TIME\") BETWEEN CAST($3 AS DATE) AND CAST($4 AS DATE) \
             ORDER BY \"TIME\" DESC LIMIT $5"
        );
        assert_eq!(
            query.param("date_start"),
            Some(&BindValue::Text("2024-01-01".to_string()))
        );
        assert_eq!(
            query.param("date_end"),
            Some(&BindValue::Text("2024-12-31".to_string()))
        );
        assert_eq!(query.param("limit"), Some(&BindValue::Integer(1000)));
    }

    #[test]
    fn test_placeholders_match_param_positions() {
        let range = QueryRange::Fundamental(DateRange::new("2024-01-01", "2024-12-31"));
        let query = builder().build("VALE3", &fields(&["P/L"]), &range).unwrap();

        let names: Vec<_> = query.params.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec!["search", "search_pattern", "date_start", "date_end", "limit"]
        );
        for i in 1..=query.params.len() {
            assert!(query.sql.contains(&format!("${i}")));
        }
        assert!(!query.sql.contains("$6"));
    }

    #[test]
    fn test_search_is_never_inlined() {
        let search = "x'); DROP TABLE \"fundamental\"; --";
        let range = QueryRange::Fundamental(DateRange::new("2024-01-01", "2024-12-31"));
        let query = builder().build(search, &fields(&["DY"]), &range).unwrap();

        assert!(!query.sql.contains(search));
        assert!(!query.sql.contains("DROP"));
        assert_eq!(query.param("search"), Some(&BindValue::Text(search.to_string())));
    }

    #[test]
    fn test_search_pattern_escapes_like_metacharacters() {
        let range = QueryRange::Historical(YearRange::new(2024, 2024));
        let query = builder().build("50%_a\\b", &fields(&["DY"]), &range).unwrap();

        assert_eq!(
            query.param("search_pattern"),
            Some(&BindValue::Text("%50\\%\\_a\\\\b%".to_string()))
        );
    }

    #[test]
    fn test_identifiers_are_quoted_and_escaped() {
        assert_eq!(quote_identifier("LUCRO LIQUIDO").unwrap(), "\"LUCRO LIQUIDO\"");
        assert_eq!(quote_identifier("a\"b").unwrap(), "\"a\"\"b\"");

        let range = QueryRange::Fundamental(DateRange::new("2024-01-01", "2024-12-31"));
        let query = builder()
            .build("PETR4", &fields(&["DY\" FROM x; --"]), &range)
            .unwrap();
        assert!(query.sql.contains("\"DY\"\" FROM x; --\""));
    }

    #[test]
    fn test_invalid_identifiers_rejected() {
        let range = QueryRange::Fundamental(DateRange::new("2024-01-01", "2024-12-31"));
        let err = builder().build("PETR4", &fields(&["DY", ""]), &range).unwrap_err();
        assert!(matches!(err, StocksError::BadRequest(_)));

        assert!(quote_identifier("a\0b").is_err());
    }

    #[test]
    fn test_row_limit_is_bound() {
        let range = QueryRange::Historical(YearRange::new(2024, 2024));
        let query = builder()
            .with_row_limit(50)
            .build("PETR4", &fields(&["DY"]), &range)
            .unwrap();
        assert_eq!(query.param("limit"), Some(&BindValue::Integer(50)));
        assert!(query.sql.ends_with("LIMIT $3"));
    }

    #[test]
    fn test_query_mode_serde() {
        assert_eq!(serde_json::to_string(&QueryMode::Historical).unwrap(), "\"historical\"");
        assert_eq!(QueryMode::Fundamental.to_string(), "fundamental");
    }
}
