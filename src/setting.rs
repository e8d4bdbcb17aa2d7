//! The single configuration cell: default, allowed kinds, conditions, and
//! an atomically replaceable current value.

use crate::conditions::Condition;
use crate::error::{Result, SettingsError};
use crate::value::{Kind, Value};
use arc_swap::ArcSwap;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use tracing::debug;

/// A named, typed, optionally-validated configuration cell.
///
/// Built through [`Setting::new`], bound into the registry with
/// [`Registry::declare`](crate::Registry::declare). Once built, the allowed
/// kinds and conditions never change; only the current value mutates, and
/// only through the validate/coerce pipeline.
///
/// ```
/// use settree::{conditions, Registry, Setting, Value};
///
/// let registry = Registry::new();
/// let timeout = registry
///     .declare(
///         "net.timeout_secs",
///         Setting::new(30)
///             .desc("Connection timeout in seconds")
///             .check(conditions::positive())
///             .build()?,
///     )?;
/// assert_eq!(timeout.value(), Value::Int(30));
/// assert_eq!(registry.value("net.timeout_secs")?, Value::Int(30));
/// # Ok::<(), settree::SettingsError>(())
/// ```
pub struct Setting {
    default: Value,
    description: String,
    allowed: Vec<Kind>,
    conditions: Vec<Condition>,
    current: ArcSwap<Value>,
    declared_at: &'static Location<'static>,
}

impl Setting {
    /// Start building a setting with the given default value.
    ///
    /// The call site is recorded as the setting's declaration location
    /// (diagnostic only; resolution never consults it).
    #[track_caller]
    pub fn new(default: impl Into<Value>) -> SettingBuilder {
        SettingBuilder {
            default: default.into(),
            description: String::new(),
            allowed: None,
            conditions: Vec::new(),
            declared_at: Location::caller(),
        }
    }

    /// The current value (the default until a successful `set_value`).
    pub fn value(&self) -> Value {
        self.current.load().as_ref().clone()
    }

    /// The declared default value.
    pub fn default(&self) -> &Value {
        &self.default
    }

    /// The human description, rendered as a comment when encoding.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Allowed kinds, in coercion order.
    pub fn kinds(&self) -> &[Kind] {
        &self.allowed
    }

    /// Source location of the declaration site.
    pub fn declared_at(&self) -> &'static Location<'static> {
        self.declared_at
    }

    /// Run the type-check/coercion/condition pipeline without storing.
    ///
    /// Returns the (possibly coerced) value that would be applied. This is
    /// the shared gate for registry updates and per-instance overrides.
    pub fn validate(&self, candidate: Value) -> Result<Value> {
        run_pipeline(candidate, &self.allowed, &self.conditions)
    }

    /// Validate and atomically replace the current value.
    ///
    /// This is the only path by which the value changes after construction.
    /// Readers never block: the replacement is an atomic pointer swap.
    pub fn set_value(&self, candidate: impl Into<Value>) -> Result<Value> {
        let value = self.validate(candidate.into())?;
        self.current.store(Arc::new(value.clone()));
        debug!(value = %value, "setting value replaced");
        Ok(value)
    }
}

impl fmt::Debug for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("default", &self.default)
            .field("current", self.current.load().as_ref())
            .field("description", &self.description)
            .field("allowed", &self.allowed)
            .finish()
    }
}

/// Builder for [`Setting`]. `build` validates the default through the same
/// pipeline every later value passes.
pub struct SettingBuilder {
    default: Value,
    description: String,
    allowed: Option<Vec<Kind>>,
    conditions: Vec<Condition>,
    declared_at: &'static Location<'static>,
}

impl SettingBuilder {
    /// Attach a human description.
    pub fn desc(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Restrict (or widen) the allowed kinds, in coercion order.
    ///
    /// Defaults to the single kind of the default value.
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = Kind>) -> Self {
        self.allowed = Some(kinds.into_iter().collect());
        self
    }

    /// Add a validity condition. Conditions are ANDed in order.
    pub fn check(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Build the setting, validating the default value.
    pub fn build(self) -> Result<Setting> {
        let allowed = self
            .allowed
            .unwrap_or_else(|| vec![self.default.kind()]);

        // The default goes through the same gate as every later value; a
        // coercible default (e.g. int default with kinds [float]) is stored
        // in its coerced form.
        let default = run_pipeline(self.default, &allowed, &self.conditions)?;

        Ok(Setting {
            current: ArcSwap::from_pointee(default.clone()),
            default,
            description: self.description,
            allowed,
            conditions: self.conditions,
            declared_at: self.declared_at,
        })
    }
}

/// Type-check/coercion then conditions, in spec order.
fn run_pipeline(candidate: Value, allowed: &[Kind], conditions: &[Condition]) -> Result<Value> {
    let value = if allowed.contains(&candidate.kind()) {
        candidate
    } else {
        // Ordered coercion: first allowed kind that accepts the value wins.
        allowed
            .iter()
            .find_map(|kind| candidate.coerce(*kind))
            .ok_or_else(|| SettingsError::TypeConversion {
                value: candidate.to_string(),
                attempted: allowed.to_vec(),
            })?
    };

    for condition in conditions {
        if !condition.check(&value) {
            return Err(SettingsError::Validation {
                condition: condition.description().to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions;

    #[test]
    fn test_default_becomes_current() {
        let s = Setting::new(3).build().unwrap();
        assert_eq!(s.value(), Value::Int(3));
        assert_eq!(s.default(), &Value::Int(3));
        assert_eq!(s.kinds(), [Kind::Int]);
    }

    #[test]
    fn test_default_must_pass_conditions() {
        let err = Setting::new(-3)
            .check(conditions::positive())
            .build()
            .unwrap_err();
        assert!(matches!(err, SettingsError::Validation { .. }));
    }

    #[test]
    fn test_default_coerced_into_declared_kinds() {
        let s = Setting::new(3).kinds([Kind::Float]).build().unwrap();
        assert_eq!(s.value(), Value::Float(3.0));
        assert_eq!(s.default(), &Value::Float(3.0));
    }

    #[test]
    fn test_set_value_same_kind() {
        let s = Setting::new(3).build().unwrap();
        s.set_value(5).unwrap();
        assert_eq!(s.value(), Value::Int(5));
    }

    #[test]
    fn test_set_value_rejects_unconvertible() {
        let s = Setting::new(6).build().unwrap();
        let err = s.set_value("hello").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::TypeConversion { ref attempted, .. } if attempted == &[Kind::Int]
        ));
        // The current value is untouched on failure.
        assert_eq!(s.value(), Value::Int(6));
    }

    #[test]
    fn test_set_value_ordered_coercion() {
        let s = Setting::new(5).kinds([Kind::Int, Kind::Str]).build().unwrap();
        // Not an int, but str accepts it.
        s.set_value("hello").unwrap();
        assert_eq!(s.value(), Value::Str("hello".into()));
        // str is an allowed kind, so "6" passes through without coercion.
        s.set_value("6").unwrap();
        assert_eq!(s.value(), Value::Str("6".into()));
    }

    #[test]
    fn test_set_value_coerces_before_conditions() {
        let s = Setting::new(10)
            .check(conditions::within(0, 100))
            .build()
            .unwrap();
        s.set_value("42").unwrap();
        assert_eq!(s.value(), Value::Int(42));
        let err = s.set_value("200").unwrap_err();
        assert!(matches!(err, SettingsError::Validation { .. }));
        assert_eq!(s.value(), Value::Int(42));
    }

    #[test]
    fn test_declared_at_points_here() {
        let s = Setting::new(1).build().unwrap();
        assert!(s.declared_at().file().ends_with("setting.rs"));
    }
}
