use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// A scalar bound to a positional placeholder.
///
/// The compiler never looks inside a value; it is moved into the bindings
/// list exactly as the builder produced it. Dates and timestamps keep the
/// text they were written with, so a decoded tree re-encodes unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Timestamp(Timestamp),
    Date(Date),
    String(String),
    /// Binary data (bytea)
    Bytes(Vec<u8>),
}

/// RFC 3339 timestamp, stored as written (offset included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(String);

/// `YYYY-MM-DD` calendar date, stored as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Date(String);

impl Timestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_datetime(&self) -> DateTime<FixedOffset> {
        // Validated on construction.
        DateTime::parse_from_rfc3339(&self.0).unwrap_or_default()
    }
}

impl TryFrom<String> for Timestamp {
    type Error = chrono::ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        DateTime::parse_from_rfc3339(&s)?;
        Ok(Self(s))
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl Date {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_naive_date(&self) -> NaiveDate {
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").unwrap_or_default()
    }
}

impl TryFrom<String> for Date {
    type Error = chrono::ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")?;
        Ok(Self(s))
    }
}

impl From<Date> for String {
    fn from(d: Date) -> Self {
        d.0
    }
}

impl Value {
    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Timestamp(_) => "timestamp",
            Value::Date(_) => "date",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Timestamp(ts) => write!(f, "'{}'", ts.as_str()),
            Value::Date(d) => write!(f, "'{}'", d.as_str()),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Bytes(bytes) => {
                write!(f, "'\\x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "'")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Int(n),
            Err(_) => Value::UInt(n),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value
where
    Tz::Offset: std::fmt::Display,
{
    fn from(ts: DateTime<Tz>) -> Self {
        Value::Timestamp(Timestamp(ts.to_rfc3339()))
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(Date(d.format("%Y-%m-%d").to_string()))
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(7u64), Value::Int(7));
        assert_eq!(Value::from(u64::MAX), Value::UInt(u64::MAX));
        assert_eq!(Value::from("hello"), Value::String("hello".into()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(vec![0xde, 0xad]), Value::Bytes(vec![0xde, 0xad]));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::from("a").to_string(), "'a'");
        assert_eq!(Value::Bytes(vec![0x01, 0xff]).to_string(), "'\\x01ff'");
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(Value::from(d).to_string(), "'2024-03-01'");
    }

    #[test]
    fn test_value_json_decoding() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 7, 1.5, "2024-03-01", "x", [1, 2]]"#).unwrap();
        assert_eq!(values[0], Value::Null);
        assert_eq!(values[1], Value::Bool(true));
        assert_eq!(values[2], Value::Int(7));
        assert_eq!(values[3], Value::Float(1.5));
        assert_eq!(values[4].type_name(), "date");
        assert_eq!(values[5], Value::String("x".into()));
        assert_eq!(values[6], Value::Bytes(vec![1, 2]));
    }

    #[test]
    fn test_timestamp_keeps_offset() {
        let v: Value = serde_json::from_str(r#""2024-03-01T10:00:00+02:00""#).unwrap();
        let Value::Timestamp(ts) = &v else {
            panic!("expected timestamp, got {:?}", v);
        };
        assert_eq!(ts.as_str(), "2024-03-01T10:00:00+02:00");
        assert_eq!(ts.to_datetime().offset().local_minus_utc(), 7200);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#""2024-03-01T10:00:00+02:00""#);
    }

    #[test]
    fn test_large_integer_is_not_widened() {
        let v: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(v, Value::UInt(u64::MAX));
        assert_eq!(serde_json::to_string(&v).unwrap(), "18446744073709551615");
    }

    #[test]
    fn test_invalid_date_text_stays_string() {
        let v: Value = serde_json::from_str(r#""2024-13-45""#).unwrap();
        assert_eq!(v, Value::String("2024-13-45".into()));
    }

    #[test]
    fn test_chrono_conversions() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let Value::Timestamp(stored) = Value::from(ts) else {
            panic!("expected timestamp");
        };
        assert_eq!(stored.to_datetime(), ts);

        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let Value::Date(stored) = Value::from(d) else {
            panic!("expected date");
        };
        assert_eq!(stored.to_naive_date(), d);
    }
}
