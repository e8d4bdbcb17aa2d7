//! TOML adapter: toml decode, hand-rolled encode.
//!
//! Nested namespaces become `[dotted.header]` tables; each setting renders
//! as `key = value` with its description as a trailing comment. Scalar
//! entries are written before any table header at the same level, as TOML
//! requires.

use super::{Format, malformed, yaml::scalar};
use crate::error::Result;
use crate::registry::{Namespace, Node};
use serde_json::Value as JsonValue;
use std::fmt::Write;

pub(crate) fn decode(text: &str) -> Result<JsonValue> {
    let table: toml::Table = toml::from_str(text).map_err(|err| malformed(Format::Toml, err))?;
    serde_json::to_value(table).map_err(|err| malformed(Format::Toml, err))
}

pub(crate) fn encode(root: &Namespace) -> String {
    let mut out = String::new();
    write_table(&mut out, root, "");
    out
}

fn write_table(out: &mut String, namespace: &Namespace, prefix: &str) {
    for (name, node) in &namespace.entries {
        if let Node::Setting(setting) = node {
            let comment = if setting.description().is_empty() {
                String::new()
            } else {
                format!("  # {}", setting.description())
            };
            let _ = writeln!(out, "{} = {}{comment}", key(name), scalar(&setting.value()));
        }
    }
    for (name, node) in &namespace.entries {
        if let Node::Namespace(child) = node {
            let header = if prefix.is_empty() {
                key(name)
            } else {
                format!("{prefix}.{}", key(name))
            };
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "[{header}]");
            write_table(out, child, &header);
        }
    }
}

/// Bare key when TOML allows it, basic-string quoted otherwise.
fn key(name: &str) -> String {
    let bare = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        name.to_string()
    } else {
        serde_json::to_string(name).unwrap_or_default()
    }
}
