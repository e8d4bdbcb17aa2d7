//! The namespace tree and the process-wide registry.
//!
//! Settings declared anywhere in a program bind into one addressable tree.
//! Binding is write-once: a name bound to a setting can never be rebound or
//! turned into a namespace, and vice versa. Values change only through the
//! settings' own validate/coerce pipeline, never by replacing the cell.

mod update;

use crate::error::{Result, SettingsError};
use crate::setting::Setting;
use crate::value::Value;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::panic::Location;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Separator for dotted setting paths.
pub const PATH_SEPARATOR: char = '.';

/// A tree node: either a nested namespace or a bound setting.
#[derive(Debug)]
pub(crate) enum Node {
    Namespace(Namespace),
    Setting(Arc<Setting>),
}

/// A mapping from name to child node. Ordered so dumps and encodes are
/// deterministic.
#[derive(Debug, Default)]
pub(crate) struct Namespace {
    pub(crate) entries: BTreeMap<String, Node>,
}

impl Namespace {
    /// Walk to the node at `segments` without creating anything.
    fn find(&self, segments: &[&str], full: &str) -> Result<&Node> {
        let Some((head, rest)) = segments.split_first() else {
            return Err(SettingsError::PathConflict {
                path: full.to_string(),
            });
        };
        let node = self
            .entries
            .get(*head)
            .ok_or_else(|| SettingsError::UnknownSetting {
                path: full.to_string(),
            })?;
        if rest.is_empty() {
            Ok(node)
        } else {
            match node {
                Node::Namespace(child) => child.find(rest, full),
                // Cannot descend through a leaf.
                Node::Setting(_) => Err(SettingsError::PathConflict {
                    path: full.to_string(),
                }),
            }
        }
    }

    /// Walk to the parent namespace of the final segment, creating
    /// intermediate namespaces along the way.
    fn make_parent(&mut self, intermediates: &[&str], full: &str) -> Result<&mut Namespace> {
        let Some((head, rest)) = intermediates.split_first() else {
            return Ok(self);
        };
        let node = self
            .entries
            .entry((*head).to_string())
            .or_insert_with(|| Node::Namespace(Namespace::default()));
        match node {
            Node::Namespace(child) => child.make_parent(rest, full),
            Node::Setting(_) => Err(SettingsError::PathConflict {
                path: full.to_string(),
            }),
        }
    }

    /// Bind a setting at `segments`, enforcing the write-once rules.
    fn bind(&mut self, segments: &[&str], full: &str, setting: Arc<Setting>) -> Result<Arc<Setting>> {
        let (leaf, intermediates) = match segments.split_last() {
            Some(parts) => parts,
            None => {
                return Err(SettingsError::PathConflict {
                    path: full.to_string(),
                })
            }
        };
        let parent = self.make_parent(intermediates, full)?;
        match parent.entries.get(*leaf) {
            None => {
                parent
                    .entries
                    .insert((*leaf).to_string(), Node::Setting(setting.clone()));
                Ok(setting)
            }
            Some(Node::Setting(_)) => Err(SettingsError::AlreadyBound {
                path: full.to_string(),
            }),
            Some(Node::Namespace(_)) => Err(SettingsError::PathConflict {
                path: full.to_string(),
            }),
        }
    }

    /// Nested mapping of current values (the persisted-state shape).
    pub(crate) fn dump(&self) -> JsonValue {
        let mut map = Map::new();
        for (name, node) in &self.entries {
            let value = match node {
                Node::Setting(setting) => setting.value().to_json(),
                Node::Namespace(child) => child.dump(),
            };
            map.insert(name.clone(), value);
        }
        JsonValue::Object(map)
    }

    fn count_settings(&self) -> usize {
        self.entries
            .values()
            .map(|node| match node {
                Node::Setting(_) => 1,
                Node::Namespace(child) => child.count_settings(),
            })
            .sum()
    }
}

/// Lookup view of a bound name.
#[derive(Debug, Clone)]
pub enum Entry {
    /// A handle to the bound setting.
    Setting(Arc<Setting>),
    /// A nested namespace exists at this path.
    Namespace,
}

/// A settings tree with write-once binding and three-tier resolution.
///
/// `Registry::new` creates an isolated tree (tests, embedding); the
/// process-wide tree is reached through [`registry()`]. Tree structure is
/// guarded by an `RwLock`; value reads and writes go through the settings'
/// lock-free slots, so readers never block on writers.
#[derive(Debug, Default)]
pub struct Registry {
    root: RwLock<Namespace>,
    declarations: RwLock<BTreeMap<String, &'static Location<'static>>>,
}

impl Registry {
    /// Create an empty, isolated registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_root(&self) -> RwLockReadGuard<'_, Namespace> {
        self.root.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_root(&self) -> RwLockWriteGuard<'_, Namespace> {
        self.root.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind a setting at a dotted path, creating intermediate namespaces.
    ///
    /// Returns the shared handle callers keep for resolution. Rebinding an
    /// occupied name always fails with `AlreadyBound`; declaration sites
    /// that can run more than once should hold their handle in a
    /// `OnceLock`/`LazyLock` static instead of redeclaring.
    pub fn declare(&self, path: &str, setting: Setting) -> Result<Arc<Setting>> {
        let segments = split_path(path)?;
        let setting = Arc::new(setting);
        let bound = self.write_root().bind(&segments, path, setting)?;
        self.declarations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), bound.declared_at());
        debug!(path, "setting declared");
        Ok(bound)
    }

    /// Look up what is bound at a dotted path.
    pub fn lookup(&self, path: &str) -> Option<Entry> {
        let segments = split_path(path).ok()?;
        match self.read_root().find(&segments, path) {
            Ok(Node::Setting(setting)) => Some(Entry::Setting(setting.clone())),
            Ok(Node::Namespace(_)) => Some(Entry::Namespace),
            Err(_) => None,
        }
    }

    /// Whether anything (setting or namespace) is bound at the path.
    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// The setting bound at a dotted path.
    pub fn setting(&self, path: &str) -> Result<Arc<Setting>> {
        let segments = split_path(path)?;
        match self.read_root().find(&segments, path)? {
            Node::Setting(setting) => Ok(setting.clone()),
            Node::Namespace(_) => Err(SettingsError::PathConflict {
                path: path.to_string(),
            }),
        }
    }

    /// The current registry-level value of the setting at the path.
    pub fn value(&self, path: &str) -> Result<Value> {
        Ok(self.setting(path)?.value())
    }

    /// Change a single setting's value through the validation pipeline.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<Value> {
        self.setting(path)?.set_value(value)
    }

    /// Nested mapping of every setting's current value.
    pub fn dump(&self) -> JsonValue {
        self.read_root().dump()
    }

    /// Number of settings bound in the tree.
    pub fn len(&self) -> usize {
        self.read_root().count_settings()
    }

    /// Whether the tree holds no settings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard the entire tree and the declaration table. Mainly for tests.
    pub fn reset(&self) {
        self.write_root().entries.clear();
        self.declarations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("registry reset");
    }

    /// Source location where the setting at `path` was declared, if any.
    pub fn declared_at(&self, path: &str) -> Option<&'static Location<'static>> {
        self.declarations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .copied()
    }

    /// All declared paths with their declaration sites, in path order.
    pub fn declarations(&self) -> Vec<(String, &'static Location<'static>)> {
        self.declarations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(path, location)| (path.clone(), *location))
            .collect()
    }

    pub(crate) fn with_root<R>(&self, f: impl FnOnce(&Namespace) -> R) -> R {
        f(&self.read_root())
    }
}

/// The process-wide registry, created on first access and living for the
/// lifetime of the process.
pub fn registry() -> &'static Registry {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    GLOBAL.get_or_init(Registry::new)
}

/// Split a dotted path, rejecting empty paths and empty segments.
fn split_path(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() || path.split(PATH_SEPARATOR).any(str::is_empty) {
        return Err(SettingsError::PathConflict {
            path: path.to_string(),
        });
    }
    Ok(path.split(PATH_SEPARATOR).collect())
}
