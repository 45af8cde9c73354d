//! 결과 행 표현.
//!
//! 저장소가 돌려주는 각 행은 컬럼 라벨 → [`Scalar`]의 순서 있는 매핑입니다.
//! JSON으로 직렬화할 때도 SELECT 순서가 그대로 유지됩니다.

use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// 단일 셀 값.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    /// JSON: `"YYYY-MM-DD"`
    Date(NaiveDate),
    /// JSON: `"YYYY-MM-DDTHH:MM:SS[.fff]"`
    Timestamp(NaiveDateTime),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_none(),
            Scalar::Integer(v) => serializer.serialize_i64(*v),
            Scalar::Float(v) => serializer.serialize_f64(*v),
            Scalar::Text(s) => serializer.serialize_str(s),
            Scalar::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            Scalar::Timestamp(ts) => serializer.collect_str(&ts.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::Date(value)
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(value: NaiveDateTime) -> Self {
        Scalar::Timestamp(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

/// 컬럼 라벨 → 값의 순서 있는 매핑.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    cells: Vec<(String, Scalar)>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    /// 셀을 추가합니다. 같은 라벨이 이미 있으면 값을 교체합니다.
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<Scalar>) {
        let label = label.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&Scalar> {
        self.cells.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut Scalar> {
        self.cells
            .iter_mut()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    /// 컬럼 라벨을 선택 순서대로 반환합니다.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.cells.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<L: Into<String>, V: Into<Scalar>> FromIterator<(L, V)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut row = ResultRow::new();
        for (label, value) in iter {
            row.insert(label, value);
        }
        row
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (label, value) in &self.cells {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_preserves_column_order_in_json() {
        let row: ResultRow = vec![
            ("TICKER", Scalar::from("PETR4")),
            ("NOME", Scalar::from("Petrobras")),
            ("ROE 2021", Scalar::Float(0.31)),
            ("DY 2021", Scalar::Null),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"TICKER":"PETR4","NOME":"Petrobras","ROE 2021":0.31,"DY 2021":null}"#
        );
    }

    #[test]
    fn test_scalar_temporal_serialization() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(serde_json::to_string(&Scalar::Date(date)).unwrap(), "\"2024-03-15\"");

        let ts = date.and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(
            serde_json::to_string(&Scalar::Timestamp(ts)).unwrap(),
            "\"2024-03-15T10:30:00\""
        );
    }

    #[test]
    fn test_insert_replaces_existing_label() {
        let mut row = ResultRow::new();
        row.insert("TIME", "2024-01-01");
        row.insert("TIME", Scalar::Null);
        assert_eq!(row.len(), 1);
        assert!(row.get("TIME").unwrap().is_null());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Scalar::from(None::<i64>), Scalar::Null);
        assert_eq!(Scalar::from(Some(7i64)), Scalar::Integer(7));
    }
}
