//! Bulk update: apply a decoded document to the tree.
//!
//! Documents are nested `serde_json::Value` mappings whose keys may
//! themselves be dotted paths; both shapes mix freely. Entries apply one at
//! a time through each setting's own pipeline - there is no rollback, and
//! the walk stops at the first failing entry.

use super::{PATH_SEPARATOR, Registry};
use crate::error::{Result, SettingsError};
use crate::value::Value;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

impl Registry {
    /// Apply a nested document of path -> value updates.
    ///
    /// Every leaf must name an existing setting (updates never create
    /// settings) and passes through that setting's type/coercion/condition
    /// pipeline. The first failure propagates; earlier entries in the same
    /// call stay applied.
    pub fn update(&self, document: &JsonValue) -> Result<()> {
        match document {
            JsonValue::Object(entries) => {
                for (key, value) in entries {
                    self.update_at(key, value)?;
                }
                Ok(())
            }
            // An empty document (e.g. a blank YAML file) is a no-op.
            JsonValue::Null => Ok(()),
            _ => Err(SettingsError::NotASetting {
                path: String::new(),
            }),
        }
    }

    /// Apply a batch of dotted-path/value pairs, in order.
    pub fn update_pairs<I, P, V>(&self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (P, V)>,
        P: AsRef<str>,
        V: Into<Value>,
    {
        for (path, value) in pairs {
            self.apply_leaf(path.as_ref(), value.into())?;
        }
        Ok(())
    }

    fn update_at(&self, path: &str, value: &JsonValue) -> Result<()> {
        match value {
            JsonValue::Object(entries) => {
                for (key, child) in entries {
                    let child_path = format!("{path}{PATH_SEPARATOR}{key}");
                    self.update_at(&child_path, child)?;
                }
                Ok(())
            }
            leaf => {
                let value =
                    Value::from_json(leaf).ok_or_else(|| SettingsError::NotASetting {
                        path: path.to_string(),
                    })?;
                self.apply_leaf(path, value)
            }
        }
    }

    fn apply_leaf(&self, path: &str, value: Value) -> Result<()> {
        let setting = self.setting(path)?;
        match setting.set_value(value) {
            Ok(applied) => {
                debug!(path, value = %applied, "setting updated");
                Ok(())
            }
            Err(err) => {
                warn!(path, %err, "update entry rejected");
                Err(err)
            }
        }
    }
}
