use serde_json::{Number, Value};

/// A single cell of a tabular dataset.
///
/// `Empty` is the missing-value marker. It is distinct from `String("")` while
/// the dataset lives in memory, but both end up as an empty cell once written
/// to a spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Number(Number),
    Boolean(bool),
    Empty,
}

impl CellValue {
    /// Builds a numeric cell from a float. Returns `None` for NaN and infinities,
    /// which have no JSON representation.
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(CellValue::Number)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Converts the cell into the JSON value sent to the Sheets API.
    /// Missing values become the empty string, everything else passes through.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::String(value) => Value::String(value.clone()),
            CellValue::Number(value) => Value::Number(value.clone()),
            CellValue::Boolean(value) => Value::Bool(*value),
            CellValue::Empty => Value::String(String::new()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(Number::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_becomes_empty_string() {
        assert_eq!(CellValue::Empty.to_json(), Value::String(String::new()));
    }

    #[test]
    fn test_values_pass_through() {
        assert_eq!(CellValue::from("abc").to_json(), Value::String("abc".into()));
        assert_eq!(CellValue::from(42i64).to_json(), serde_json::json!(42));
        assert_eq!(CellValue::from(true).to_json(), Value::Bool(true));
        assert_eq!(
            CellValue::from_f64(1.5).map(|cell| cell.to_json()),
            Some(serde_json::json!(1.5))
        );
    }

    #[test]
    fn test_non_finite_floats_are_rejected() {
        assert_eq!(CellValue::from_f64(f64::NAN), None);
        assert_eq!(CellValue::from_f64(f64::INFINITY), None);
    }
}
