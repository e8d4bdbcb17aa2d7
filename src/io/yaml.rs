//! YAML adapter: serde_yaml decode, hand-rolled encode.
//!
//! Encoding is hand-rolled because the serde encoder cannot attach setting
//! descriptions as trailing comments. Leaf scalars are rendered in their
//! JSON form (strings quoted), which is valid YAML and keeps
//! decode(encode(tree)) faithful to the values.

use super::{Format, malformed};
use crate::error::Result;
use crate::registry::{Namespace, Node};
use crate::value::Value;
use serde_json::Value as JsonValue;
use std::fmt::Write;

pub(crate) fn decode(text: &str) -> Result<JsonValue> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|err| malformed(Format::Yaml, err))?;
    // Re-serializing rejects YAML shapes a document cannot hold, such as
    // non-string mapping keys.
    serde_json::to_value(value).map_err(|err| malformed(Format::Yaml, err))
}

pub(crate) fn encode(root: &Namespace) -> String {
    let mut out = String::new();
    write_namespace(&mut out, root, 0);
    out
}

fn write_namespace(out: &mut String, namespace: &Namespace, level: usize) {
    let spacer = "  ".repeat(level);
    for (name, node) in &namespace.entries {
        match node {
            Node::Setting(setting) => {
                let comment = if setting.description().is_empty() {
                    String::new()
                } else {
                    format!("  # {}", setting.description())
                };
                let _ = writeln!(out, "{spacer}{name}: {}{comment}", scalar(&setting.value()));
            }
            Node::Namespace(child) => {
                let _ = writeln!(out, "{spacer}{name}:");
                write_namespace(out, child, level + 1);
            }
        }
    }
}

pub(super) fn scalar(value: &Value) -> String {
    serde_json::to_string(&value.to_json()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettingsError;
    use serde_json::json;

    #[test]
    fn test_decode_nested_mapping() {
        let doc = decode("a: 1\nnested:\n  b: hello\n").unwrap();
        assert_eq!(doc, json!({"a": 1, "nested": {"b": "hello"}}));
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode("a: [unclosed").unwrap_err();
        assert!(matches!(err, SettingsError::Format { .. }));
    }

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(scalar(&Value::Int(3)), "3");
        assert_eq!(scalar(&Value::Float(6.0)), "6.0");
        assert_eq!(scalar(&Value::Bool(true)), "true");
        // Strings are quoted so "6" survives a round trip as a string.
        assert_eq!(scalar(&Value::Str("6".into())), "\"6\"");
        assert_eq!(scalar(&Value::seq([1, 2])), "[1,2]");
    }
}
