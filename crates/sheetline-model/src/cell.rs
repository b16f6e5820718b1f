//! Raw cell values.

use std::fmt;

use chrono::NaiveDateTime;
use serde_json::{Number, Value};

/// The decoded value of one spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// A date/time the reader already decoded from the cell's number format.
    DateTime(NaiveDateTime),
    Empty,
}

/// One spreadsheet row: raw column labels paired with their cell values,
/// in column order.
pub type RawRow = Vec<(String, CellValue)>;

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns true for cells with no content.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the text content for text cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Converts the value to JSON.
    ///
    /// Returns `None` for numbers JSON cannot represent (NaN, infinities).
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Text(value) => Some(Value::String(value.clone())),
            Self::Number(value) => number_to_json(*value),
            Self::Bool(value) => Some(Value::Bool(*value)),
            Self::DateTime(value) => Some(Value::String(
                value.format("%Y-%m-%dT%H:%M:%S").to_string(),
            )),
            Self::Empty => Some(Value::Null),
        }
    }

    /// Like [`CellValue::to_json`], but maps unrepresentable numbers to `null`.
    pub fn to_json_lossy(&self) -> Value {
        self.to_json().unwrap_or(Value::Null)
    }
}

/// Integral values inside the `i64` range become JSON integers so that a
/// cell holding `12` serializes as `12`, not `12.0`.
fn number_to_json(value: f64) -> Option<Value> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Some(Value::Number(Number::from(value as i64)));
    }
    Number::from_f64(value).map(Value::Number)
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                    write!(f, "{}", *value as i64)
                } else {
                    write!(f, "{value}")
                }
            }
            Self::Bool(value) => write!(f, "{value}"),
            Self::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            Self::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn integral_numbers_serialize_as_integers() {
        assert_eq!(CellValue::Number(12.0).to_json(), Some(Value::from(12)));
        assert_eq!(CellValue::Number(-3.0).to_json(), Some(Value::from(-3)));
        assert_eq!(CellValue::Number(1.5).to_json(), Some(Value::from(1.5)));
    }

    #[test]
    fn non_finite_numbers_have_no_json_form() {
        assert_eq!(CellValue::Number(f64::NAN).to_json(), None);
        assert_eq!(CellValue::Number(f64::INFINITY).to_json_lossy(), Value::Null);
    }

    #[test]
    fn display_matches_label_coercion() {
        assert_eq!(CellValue::Number(2024.0).to_string(), "2024");
        assert_eq!(CellValue::Number(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
        assert_eq!(CellValue::Empty.to_string(), "");
        let moment = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();
        assert_eq!(CellValue::DateTime(moment).to_string(), "2024-02-29 08:05:00");
    }
}
