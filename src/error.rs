//! Error taxonomy for registry mutation, validation, and loading.

use crate::value::Kind;
use thiserror::Error;

/// Result type for all registry operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Errors raised by the settings registry.
///
/// All errors are raised synchronously at the point of violation and are
/// never retried internally. A bulk update stops at the first failing entry
/// and leaves earlier successful entries applied.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A value that is not a representable setting value (e.g. a `null`
    /// leaf in a decoded document) was offered where a setting is required.
    #[error("'{path}' is not a setting value; only scalars and sequences can be applied to a setting")]
    NotASetting { path: String },

    /// Attempted rebind of a name already bound to a setting.
    #[error("setting '{path}' is already in the registry - use update or load to change its value")]
    AlreadyBound { path: String },

    /// A namespace and a setting collided while traversing or binding.
    #[error("path conflict at '{path}': a namespace cannot replace a setting, nor a setting a namespace")]
    PathConflict { path: String },

    /// An update or load referenced a path absent from the tree. Updates
    /// never auto-create settings.
    #[error("unknown setting '{path}': updates do not create settings")]
    UnknownSetting { path: String },

    /// The value's kind is not allowed and no ordered coercion succeeded.
    #[error("could not convert '{value}' into any of: {}", join_kinds(.attempted))]
    TypeConversion { value: String, attempted: Vec<Kind> },

    /// The value failed one of the setting's conditions.
    #[error("invalid value '{value}': {condition}")]
    Validation { condition: String, value: String },

    /// Malformed YAML or TOML input, or an unrecognized format.
    #[error("format error: {message}")]
    Format { message: String },

    /// File-level load/save failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_kinds(kinds: &[Kind]) -> String {
    kinds
        .iter()
        .map(|k| k.name())
        .collect::<Vec<_>>()
        .join(", ")
}
