//! Validity conditions for setting values.
//!
//! A [`Condition`] is a pure, total predicate over a candidate value. A
//! setting ANDs its conditions together; an empty condition list always
//! passes. The description is the text carried into the validation error
//! when a condition rejects a value.

use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A named validity predicate over candidate setting values.
#[derive(Clone)]
pub struct Condition {
    desc: String,
    pred: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Condition {
    /// Create a condition from a description and a predicate.
    ///
    /// The predicate must be pure and total: no side effects, no panics,
    /// a plain `false` for values it does not understand.
    pub fn new<F>(desc: impl Into<String>, pred: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            desc: desc.into(),
            pred: Arc::new(pred),
        }
    }

    /// Evaluate the condition against a candidate value.
    pub fn check(&self, value: &Value) -> bool {
        (self.pred)(value)
    }

    /// The human-readable description, used in error messages.
    pub fn description(&self) -> &str {
        &self.desc
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Condition({})", self.desc)
    }
}

/// Value must be a positive number.
pub fn positive() -> Condition {
    Condition::new("value must be positive", |v| {
        v.as_f64().is_some_and(|n| n > 0.0)
    })
}

/// Value must be a negative number.
pub fn negative() -> Condition {
    Condition::new("value must be negative", |v| {
        v.as_f64().is_some_and(|n| n < 0.0)
    })
}

/// Value must be strictly greater than `other`.
pub fn greater_than(other: impl Into<Value>) -> Condition {
    let other = other.into();
    Condition::new(format!("value must be greater than {}", other), move |v| {
        v.compare(&other) == Some(Ordering::Greater)
    })
}

/// Value must be strictly lesser than `other`.
pub fn lesser_than(other: impl Into<Value>) -> Condition {
    let other = other.into();
    Condition::new(format!("value must be lesser than {}", other), move |v| {
        v.compare(&other) == Some(Ordering::Less)
    })
}

/// Value must be strictly within `minimum` and `maximum` (both exclusive).
pub fn within(minimum: impl Into<Value>, maximum: impl Into<Value>) -> Condition {
    let (minimum, maximum) = (minimum.into(), maximum.into());
    Condition::new(
        format!("value must be within {} and {}", minimum, maximum),
        move |v| {
            v.compare(&minimum) == Some(Ordering::Greater)
                && v.compare(&maximum) == Some(Ordering::Less)
        },
    )
}

/// Value must be equal to one of the given values.
pub fn one_of<I, T>(values: I) -> Condition
where
    I: IntoIterator<Item = T>,
    T: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    let listing = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Condition::new(format!("value must be one of: {}", listing), move |v| {
        values.contains(v)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_and_negative() {
        assert!(positive().check(&Value::Int(3)));
        assert!(positive().check(&Value::Float(0.1)));
        assert!(!positive().check(&Value::Int(0)));
        assert!(!positive().check(&Value::Str("3".into())));
        assert!(negative().check(&Value::Int(-3)));
        assert!(!negative().check(&Value::Int(3)));
    }

    #[test]
    fn test_bounds() {
        assert!(greater_than(2).check(&Value::Int(3)));
        assert!(!greater_than(2).check(&Value::Int(2)));
        assert!(lesser_than(2).check(&Value::Float(1.5)));
        assert!(within(1, 10).check(&Value::Int(5)));
        // Both ends are exclusive.
        assert!(!within(1, 10).check(&Value::Int(1)));
        assert!(!within(1, 10).check(&Value::Int(10)));
    }

    #[test]
    fn test_string_ordering() {
        assert!(greater_than("apple").check(&Value::Str("banana".into())));
        assert!(!greater_than("apple").check(&Value::Int(5)));
    }

    #[test]
    fn test_one_of() {
        let c = one_of(["red", "green", "blue"]);
        assert!(c.check(&Value::Str("green".into())));
        assert!(!c.check(&Value::Str("mauve".into())));
        assert_eq!(c.description(), "value must be one of: red, green, blue");
    }

    #[test]
    fn test_custom_condition() {
        let even = Condition::new("value must be even", |v| {
            matches!(v, Value::Int(i) if i % 2 == 0)
        });
        assert!(even.check(&Value::Int(4)));
        assert!(!even.check(&Value::Int(5)));
    }
}
