//! YAML/TOML adapters over the registry's public operations.
//!
//! Decoding produces the nested-mapping document shape [`Registry::update`]
//! consumes; encoding renders each setting as `name: value` with its
//! description attached as a trailing comment. Decode failures are
//! [`SettingsError::Format`], distinct from the update errors.

mod toml;
mod yaml;

use crate::error::{Result, SettingsError};
use crate::registry::Registry;
use serde_json::Value as JsonValue;
use std::fmt;
use std::fs;
use std::path::Path;

/// Supported text formats for load and encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
}

impl Format {
    /// Infer the format from a file extension (`.yaml`/`.yml`/`.toml`).
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Yaml => f.write_str("yaml"),
            Format::Toml => f.write_str("toml"),
        }
    }
}

/// Decode text into the nested-mapping document shape.
pub fn decode(text: &str, format: Format) -> Result<JsonValue> {
    match format {
        Format::Yaml => yaml::decode(text),
        Format::Toml => toml::decode(text),
    }
}

pub(crate) fn malformed(format: Format, err: impl fmt::Display) -> SettingsError {
    SettingsError::Format {
        message: format!("malformed {format} input: {err}"),
    }
}

impl Registry {
    /// Decode `text` and apply it as a bulk update.
    pub fn load(&self, text: &str, format: Format) -> Result<()> {
        let document = decode(text, format)?;
        self.update(&document)
    }

    /// Render the tree as text, descriptions as trailing comments.
    pub fn encode(&self, format: Format) -> String {
        self.with_root(|root| match format {
            Format::Yaml => yaml::encode(root),
            Format::Toml => toml::encode(root),
        })
    }

    /// Load from a file, inferring the format from its extension.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = format_for(path)?;
        let text = fs::read_to_string(path)?;
        self.load(&text, format)
    }

    /// Write the encoded tree to a file, inferring the format from its
    /// extension.
    pub fn save_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = format_for(path)?;
        fs::write(path, self.encode(format))?;
        Ok(())
    }
}

fn format_for(path: &Path) -> Result<Format> {
    Format::from_extension(path).ok_or_else(|| SettingsError::Format {
        message: format!("unrecognized settings format: '{}'", path.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            Format::from_extension(Path::new("a/settings.yaml")),
            Some(Format::Yaml)
        );
        assert_eq!(
            Format::from_extension(Path::new("settings.YML")),
            Some(Format::Yaml)
        );
        assert_eq!(
            Format::from_extension(Path::new("settings.toml")),
            Some(Format::Toml)
        );
        assert_eq!(Format::from_extension(Path::new("settings.ini")), None);
        assert_eq!(Format::from_extension(Path::new("settings")), None);
    }
}
