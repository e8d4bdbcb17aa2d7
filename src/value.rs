//! Dynamic value model for setting defaults, current values, and updates.
//!
//! Decoded YAML/TOML documents travel as nested `serde_json::Value` mappings;
//! leaves convert into [`Value`] before they reach a setting. `Value` is a
//! closed enum with no mapping variant - a mapping is namespace structure,
//! never a setting value - so every representable value is immutable once
//! stored.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;

/// Type tag for a [`Value`], used for allowed-type sets and ordered coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Str,
    Seq,
}

impl Kind {
    /// Short lowercase name used in error messages and docs.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::Seq => "seq",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A setting value: a scalar or a fixed sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
}

impl Value {
    /// The type tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Seq(_) => Kind::Seq,
        }
    }

    /// Numeric view for ordering conditions. `None` for non-numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Partial ordering used by the comparison conditions: numeric across
    /// `Int`/`Float`, lexicographic for `Str`, undefined otherwise.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => {
                let (a, b) = (self.as_f64()?, other.as_f64()?);
                a.partial_cmp(&b)
            }
        }
    }

    /// Attempt conversion to the given kind. Matching kinds pass through;
    /// otherwise the conversion rules are deliberately narrow:
    ///
    /// - `int`: truncating from `float`, 0/1 from `bool`, parsed from `str`
    /// - `float`: from `int`, `bool`, or a parseable `str`
    /// - `str`: display form of any scalar (never from `seq`)
    /// - `bool`: `"true"`/`"false"` (ASCII case-insensitive) or integer 0/1
    /// - `seq`: identity only
    pub fn coerce(&self, kind: Kind) -> Option<Value> {
        if self.kind() == kind {
            return Some(self.clone());
        }
        match (self, kind) {
            (Value::Float(f), Kind::Int) if f.is_finite() => Some(Value::Int(*f as i64)),
            (Value::Bool(b), Kind::Int) => Some(Value::Int(i64::from(*b))),
            (Value::Str(s), Kind::Int) => s.trim().parse().ok().map(Value::Int),

            (Value::Int(i), Kind::Float) => Some(Value::Float(*i as f64)),
            (Value::Bool(b), Kind::Float) => Some(Value::Float(f64::from(u8::from(*b)))),
            (Value::Str(s), Kind::Float) => s.trim().parse().ok().map(Value::Float),

            (Value::Bool(_) | Value::Int(_) | Value::Float(_), Kind::Str) => {
                Some(Value::Str(self.to_string()))
            }

            (Value::Str(s), Kind::Bool) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Some(Value::Bool(true))
                } else if s.eq_ignore_ascii_case("false") {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
            (Value::Int(0), Kind::Bool) => Some(Value::Bool(false)),
            (Value::Int(1), Kind::Bool) => Some(Value::Bool(true)),

            _ => None,
        }
    }

    /// Convert a decoded document leaf into a setting value.
    ///
    /// Integral JSON numbers become `Int`, other numbers `Float`; arrays
    /// convert element-wise. `null` and objects are not setting values.
    pub fn from_json(json: &JsonValue) -> Option<Value> {
        match json {
            JsonValue::Bool(b) => Some(Value::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::Int(i))
                } else {
                    n.as_f64().map(Value::Float)
                }
            }
            JsonValue::String(s) => Some(Value::Str(s.clone())),
            JsonValue::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Seq),
            JsonValue::Null | JsonValue::Object(_) => None,
        }
    }

    /// Render as a document leaf (the shape `Registry::dump` produces).
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Str(s) => JsonValue::String(s.clone()),
            Value::Seq(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    /// Build a sequence value from anything convertible.
    pub fn seq<I, T>(items: I) -> Value
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            // Keep a trailing ".0" on round floats so the display form stays
            // distinguishable from an int (and re-parses as a float).
            Value::Float(v) => match serde_json::Number::from_f64(*v) {
                Some(n) => write!(f, "{}", n),
                None => write!(f, "{}", v),
            },
            Value::Str(s) => f.write_str(s),
            Value::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Value::from_json(&json)
            .ok_or_else(|| D::Error::custom("null and mappings are not setting values"))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Seq(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_matches_pass_through() {
        assert_eq!(Value::Int(5).coerce(Kind::Int), Some(Value::Int(5)));
        assert_eq!(
            Value::Str("x".into()).coerce(Kind::Str),
            Some(Value::Str("x".into()))
        );
    }

    #[test]
    fn test_str_to_int_parses_or_fails() {
        assert_eq!(Value::Str("6".into()).coerce(Kind::Int), Some(Value::Int(6)));
        assert_eq!(Value::Str(" 42 ".into()).coerce(Kind::Int), Some(Value::Int(42)));
        assert_eq!(Value::Str("hello".into()).coerce(Kind::Int), None);
        assert_eq!(Value::Str("6.5".into()).coerce(Kind::Int), None);
    }

    #[test]
    fn test_float_to_int_truncates() {
        assert_eq!(Value::Float(5.7).coerce(Kind::Int), Some(Value::Int(5)));
        assert_eq!(Value::Float(f64::NAN).coerce(Kind::Int), None);
    }

    #[test]
    fn test_scalar_to_str() {
        assert_eq!(
            Value::Int(6).coerce(Kind::Str),
            Some(Value::Str("6".into()))
        );
        assert_eq!(
            Value::Float(6.0).coerce(Kind::Str),
            Some(Value::Str("6.0".into()))
        );
        assert_eq!(Value::seq([1, 2]).coerce(Kind::Str), None);
    }

    #[test]
    fn test_bool_coercion_is_strict() {
        assert_eq!(
            Value::Str("TRUE".into()).coerce(Kind::Bool),
            Some(Value::Bool(true))
        );
        assert_eq!(Value::Str("yes".into()).coerce(Kind::Bool), None);
        assert_eq!(Value::Int(1).coerce(Kind::Bool), Some(Value::Bool(true)));
        assert_eq!(Value::Int(2).coerce(Kind::Bool), None);
    }

    #[test]
    fn test_compare_across_numeric_kinds() {
        assert_eq!(
            Value::Int(3).compare(&Value::Float(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Str("a".into()).compare(&Value::Str("b".into())),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Str("a".into()).compare(&Value::Int(1)), None);
    }

    #[test]
    fn test_from_json_rejects_null_and_objects() {
        assert_eq!(Value::from_json(&json!(null)), None);
        assert_eq!(Value::from_json(&json!({"a": 1})), None);
        assert_eq!(Value::from_json(&json!([1, null])), None);
    }

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(Value::from_json(&json!(3)), Some(Value::Int(3)));
        assert_eq!(Value::from_json(&json!(3.5)), Some(Value::Float(3.5)));
        assert_eq!(
            Value::from_json(&json!([1, "a"])),
            Some(Value::seq([Value::Int(1), Value::Str("a".into())]))
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let v = Value::seq([Value::Int(1), Value::Str("two".into())]);
        let text = serde_json::to_string(&v).unwrap();
        assert_eq!(text, "[1,\"two\"]");
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, v);
        assert!(serde_json::from_str::<Value>("null").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let v = Value::seq([Value::Int(1), Value::Str("two".into()), Value::Bool(true)]);
        assert_eq!(Value::from_json(&v.to_json()), Some(v));
    }
}
