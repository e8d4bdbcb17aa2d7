//! Three-tier value resolution and per-host instance overrides.
//!
//! Precedence, highest first: instance override, then the setting's
//! registry-level current value (which starts as the declared default).
//! The registry never stores overrides; a host object owns its own
//! [`Overrides`] table alongside the `Arc<Setting>` handles it resolves
//! against, and both drop with the host.

use crate::error::Result;
use crate::setting::Setting;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A per-host override table shadowing registry values for one host only.
///
/// ```
/// use settree::{resolve, Overrides, Registry, Setting, Value};
///
/// let registry = Registry::new();
/// let width = registry.declare("page.width", Setting::new(80).build()?)?;
///
/// let mut overrides = Overrides::new();
/// overrides.set(&width, 120)?;
///
/// registry.set("page.width", 100)?;
/// assert_eq!(resolve(&width, Some(&overrides)), Value::Int(120));
///
/// overrides.remove(&width);
/// assert_eq!(resolve(&width, Some(&overrides)), Value::Int(100));
/// # Ok::<(), settree::SettingsError>(())
/// ```
#[derive(Debug, Default)]
pub struct Overrides {
    // Keyed by setting identity; the stored handle keeps the identity
    // stable for as long as the override lives.
    values: HashMap<usize, (Arc<Setting>, Value)>,
}

impl Overrides {
    /// Create an empty override table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an override for `setting`, running the same type/coercion/
    /// condition pipeline as a registry update. Never touches the
    /// registry-level value.
    pub fn set(&mut self, setting: &Arc<Setting>, value: impl Into<Value>) -> Result<Value> {
        let value = setting.validate(value.into())?;
        self.values
            .insert(identity(setting), (setting.clone(), value.clone()));
        Ok(value)
    }

    /// The override recorded for `setting`, if any.
    pub fn get(&self, setting: &Arc<Setting>) -> Option<&Value> {
        self.values.get(&identity(setting)).map(|(_, value)| value)
    }

    /// Remove the override for `setting`; resolution falls back to the
    /// registry value.
    pub fn remove(&mut self, setting: &Arc<Setting>) -> Option<Value> {
        self.values.remove(&identity(setting)).map(|(_, value)| value)
    }

    /// Number of overrides recorded.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no overrides are recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Compute the effective value of a setting for an optional host.
///
/// Instance override first, then the registry-level current value. The
/// default needs no tier of its own: it is the current value's initial
/// state.
pub fn resolve(setting: &Arc<Setting>, overrides: Option<&Overrides>) -> Value {
    overrides
        .and_then(|o| o.get(setting).cloned())
        .unwrap_or_else(|| setting.value())
}

fn identity(setting: &Arc<Setting>) -> usize {
    Arc::as_ptr(setting) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions;
    use crate::error::SettingsError;

    fn handle(default: impl Into<Value>) -> Arc<Setting> {
        Arc::new(Setting::new(default).build().unwrap())
    }

    #[test]
    fn test_override_shadows_registry_value() {
        let setting = handle(1);
        let mut overrides = Overrides::new();

        assert_eq!(resolve(&setting, Some(&overrides)), Value::Int(1));

        overrides.set(&setting, 3).unwrap();
        setting.set_value(2).unwrap();

        // The override wins regardless of the registry value.
        assert_eq!(resolve(&setting, Some(&overrides)), Value::Int(3));
        assert_eq!(resolve(&setting, None), Value::Int(2));
    }

    #[test]
    fn test_remove_falls_back() {
        let setting = handle(1);
        let mut overrides = Overrides::new();
        overrides.set(&setting, 3).unwrap();

        assert_eq!(overrides.remove(&setting), Some(Value::Int(3)));
        assert_eq!(resolve(&setting, Some(&overrides)), Value::Int(1));
        assert_eq!(overrides.remove(&setting), None);
    }

    #[test]
    fn test_override_runs_full_pipeline() {
        let setting = Arc::new(
            Setting::new(3)
                .check(conditions::positive())
                .build()
                .unwrap(),
        );
        let mut overrides = Overrides::new();

        let err = overrides.set(&setting, -3).unwrap_err();
        assert!(matches!(err, SettingsError::Validation { .. }));
        assert!(overrides.is_empty());

        // Coercion applies to overrides too.
        overrides.set(&setting, "7").unwrap();
        assert_eq!(resolve(&setting, Some(&overrides)), Value::Int(7));
    }

    #[test]
    fn test_overrides_are_per_setting() {
        let a = handle(1);
        let b = handle(2);
        let mut overrides = Overrides::new();
        overrides.set(&a, 10).unwrap();

        assert_eq!(resolve(&a, Some(&overrides)), Value::Int(10));
        assert_eq!(resolve(&b, Some(&overrides)), Value::Int(2));
        assert_eq!(overrides.len(), 1);
    }
}
