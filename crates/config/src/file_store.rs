// JSON file-backed settings store
// Overlay file (default ~/.config/strata/config.json) over an immutable
// defaults document supplied by the embedding application.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::path::KeyPath;
use crate::store::{type_name, ConfigError, SettingsStore};

/// Two-tier settings store: a mutable overlay persisted as pretty JSON,
/// resolved over an immutable defaults document on merged reads.
///
/// Mutations only ever touch the overlay; `save` rewrites the overlay
/// file in place, preserving key order across edit cycles.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    defaults: Value,
    overlay: Value,
}

impl FileStore {
    /// Default per-user overlay location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("strata")
            .join("config.json")
    }

    /// Open the overlay file at `path`. A missing file is an empty
    /// overlay; an unreadable or unparsable file is a fatal error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let overlay = match fs::read_to_string(&path) {
            Ok(contents) => {
                let value: Value = serde_json::from_str(&contents).map_err(|e| {
                    ConfigError::Parse(format!("{}: {}", path.display(), e))
                })?;
                if !value.is_object() {
                    return Err(ConfigError::Parse(format!(
                        "{}: root must be a JSON object, found {}",
                        path.display(),
                        type_name(&value)
                    )));
                }
                value
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Value::Object(Map::new())
            }
            Err(e) => {
                return Err(ConfigError::Read(format!("{}: {}", path.display(), e)))
            }
        };

        Ok(Self {
            path,
            defaults: Value::Object(Map::new()),
            overlay,
        })
    }

    /// Attach a defaults document (a JSON object) resolved under the
    /// overlay on merged reads.
    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileStore {
    fn get(&self, path: &KeyPath, merged: bool) -> Option<Value> {
        let overlay = descend(&self.overlay, path.segments());
        if !merged {
            return overlay.cloned();
        }
        let defaults = descend(&self.defaults, path.segments());
        match (defaults, overlay) {
            (None, None) => None,
            (Some(d), None) => Some(d.clone()),
            (None, Some(o)) => Some(o.clone()),
            (Some(d), Some(o)) => Some(merge(d.clone(), o.clone())),
        }
    }

    fn set(&mut self, path: &KeyPath, value: Value) -> Result<(), ConfigError> {
        if path.is_root() {
            return Err(ConfigError::InvalidPath(
                "cannot replace the root of the settings tree".into(),
            ));
        }
        set_at(&mut self.overlay, path.segments(), value)
            .map_err(|msg| ConfigError::InvalidPath(format!("'{}': {}", path, msg)))
    }

    fn remove(&mut self, path: &KeyPath) -> Result<(), ConfigError> {
        let Some((last, parents)) = path.segments().split_last() else {
            return Err(ConfigError::InvalidPath(
                "cannot remove the root of the settings tree".into(),
            ));
        };

        // A path that resolves to nothing is already removed.
        let Some(parent) = descend_mut(&mut self.overlay, parents) else {
            return Ok(());
        };
        match parent {
            Value::Object(map) => {
                map.shift_remove(last.as_str());
            }
            Value::Array(items) => {
                if let Ok(idx) = last.parse::<usize>() {
                    if idx < items.len() {
                        items.remove(idx);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn save(&mut self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Write(format!("{}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(&self.overlay)
            .map_err(|e| ConfigError::Write(e.to_string()))?;
        fs::write(&self.path, json)
            .map_err(|e| ConfigError::Write(format!("{}: {}", self.path.display(), e)))
    }
}

/// Walk `root` by segments: object fields by key, array elements by
/// decimal index. Returns None as soon as a segment does not resolve.
fn descend<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = match node {
            Value::Object(map) => map.get(segment.as_str())?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

fn descend_mut<'a>(root: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    let mut node = root;
    for segment in segments {
        node = match node {
            Value::Object(map) => map.get_mut(segment.as_str())?,
            Value::Array(items) => {
                let idx = segment.parse::<usize>().ok()?;
                items.get_mut(idx)?
            }
            _ => return None,
        };
    }
    Some(node)
}

/// Assign `value` at `segments`, creating missing intermediate objects.
///
/// Existing nodes are validated before anything is written: descending
/// into a scalar or indexing an array out of range fails with no partial
/// mutation. A missing object key grows the whole remaining chain in one
/// insertion.
fn set_at(node: &mut Value, segments: &[String], value: Value) -> Result<(), String> {
    let Some((head, rest)) = segments.split_first() else {
        return Err("empty path".into());
    };

    match node {
        Value::Object(map) => {
            if rest.is_empty() {
                map.insert(head.clone(), value);
                Ok(())
            } else if let Some(child) = map.get_mut(head.as_str()) {
                set_at(child, rest, value)
            } else {
                map.insert(head.clone(), chain(rest, value));
                Ok(())
            }
        }
        Value::Array(items) => {
            let idx: usize = head
                .parse()
                .map_err(|_| format!("'{}' is not a list index", head))?;
            let slot = items
                .get_mut(idx)
                .ok_or_else(|| format!("list index {} out of range", idx))?;
            if rest.is_empty() {
                *slot = value;
                Ok(())
            } else {
                set_at(slot, rest, value)
            }
        }
        other => Err(format!("cannot descend into {}", type_name(other))),
    }
}

/// Nest `value` under `segments`: `["a","b"], v` -> `{"a":{"b":v}}`.
fn chain(segments: &[String], value: Value) -> Value {
    segments.iter().rev().fold(value, |acc, segment| {
        let mut map = Map::new();
        map.insert(segment.clone(), acc);
        Value::Object(map)
    })
}

/// Deep merge: objects merge recursively with `over` winning per key;
/// any other pairing replaces wholesale.
fn merge(base: Value, over: Value) -> Value {
    match (base, over) {
        (Value::Object(mut base_map), Value::Object(over_map)) => {
            for (key, over_value) in over_map {
                match base_map.shift_remove(&key) {
                    Some(base_value) => {
                        base_map.insert(key, merge(base_value, over_value));
                    }
                    None => {
                        base_map.insert(key, over_value);
                    }
                }
            }
            Value::Object(base_map)
        }
        (_, over) => over,
    }
}
