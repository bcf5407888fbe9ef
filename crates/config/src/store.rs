// Settings store abstraction
//
// Editors and the CLI operate against this trait, never against a concrete
// file store directly, so tests can swap in an in-memory implementation.

use serde_json::Value;

use crate::path::KeyPath;

/// Errors from store operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Could not read the backing file.
    Read(String),
    /// Could not write the backing file.
    Write(String),
    /// The backing file is not valid JSON.
    Parse(String),
    /// A path segment cannot be resolved for writing (descends into a
    /// scalar, bad array index, or addresses the root).
    InvalidPath(String),
    /// A list operation targeted a non-list value.
    NotAList { path: String, found: &'static str },
    /// A typed setter was given input it cannot convert.
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read(msg) => write!(f, "cannot read config: {}", msg),
            ConfigError::Write(msg) => write!(f, "cannot write config: {}", msg),
            ConfigError::Parse(msg) => write!(f, "cannot parse config: {}", msg),
            ConfigError::InvalidPath(msg) => write!(f, "invalid path: {}", msg),
            ConfigError::NotAList { path, found } => {
                write!(f, "value at '{}' is {}, not a list", path, found)
            }
            ConfigError::InvalidValue(msg) => write!(f, "invalid value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Human-readable JSON type name, for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// A hierarchical settings tree with typed setters and persistence.
///
/// `get` with `merged = true` resolves through the store's layered tiers
/// (overlay over defaults); `merged = false` restricts to the explicit
/// overlay tier. Mutations touch only the overlay tier and take effect
/// durably once `save` returns.
///
/// Removal is an explicit operation: `set` stores whatever value it is
/// given, including `Value::Null`.
pub trait SettingsStore {
    fn get(&self, path: &KeyPath, merged: bool) -> Option<Value>;

    fn set(&mut self, path: &KeyPath, value: Value) -> Result<(), ConfigError>;

    /// Parse `raw` as a boolean and set it. Accepts (case-insensitive)
    /// `1/true/yes/y/on` and `0/false/no/n/off`; anything else is an
    /// `InvalidValue` error and no mutation happens.
    fn set_bool(&mut self, path: &KeyPath, raw: &str) -> Result<(), ConfigError> {
        let value = parse_bool(raw)?;
        self.set(path, Value::Bool(value))
    }

    /// Parse `raw` as an `f64` and set it. Non-finite values are rejected
    /// (JSON cannot represent them).
    fn set_float(&mut self, path: &KeyPath, raw: &str) -> Result<(), ConfigError> {
        let value = parse_float(raw)?;
        self.set(path, Value::Number(value))
    }

    /// Parse `raw` as an `i64` and set it.
    fn set_int(&mut self, path: &KeyPath, raw: &str) -> Result<(), ConfigError> {
        let value = parse_int(raw)?;
        self.set(path, Value::from(value))
    }

    /// Remove the value at `path` from the overlay tier. Removing a path
    /// that does not exist is a no-op success.
    fn remove(&mut self, path: &KeyPath) -> Result<(), ConfigError>;

    fn save(&mut self) -> Result<(), ConfigError>;
}

pub(crate) fn parse_bool(raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(format!(
            "'{}' is not a boolean (try true/false, yes/no, 1/0)",
            raw
        ))),
    }
}

pub(crate) fn parse_float(raw: &str) -> Result<serde_json::Number, ConfigError> {
    let parsed: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("'{}' is not a float", raw)))?;
    serde_json::Number::from_f64(parsed)
        .ok_or_else(|| ConfigError::InvalidValue(format!("'{}' is not a finite float", raw)))
}

pub(crate) fn parse_int(raw: &str) -> Result<i64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("'{}' is not an integer", raw)))
}
