// Path-addressed edit operations over a settings store.
//
// Each function performs one read-validate-write cycle against an injected
// store and persists before returning; a mutation that is not saved is not
// considered complete. Failures are detected before any write, so the
// store never ends up with a partial edit.

use serde_json::Value;

use strata_config::store::type_name;
use strata_config::{ConfigError, KeyPath, SettingsStore};

/// A `set` value argument, already routed by the command-line flags.
/// The coercion kinds are mutually exclusive by construction.
pub enum ValueArg<'a> {
    /// Store as given (raw text or a JSON-parsed value), no conversion.
    Plain(Value),
    /// Coerce through the store's typed boolean setter.
    AsBool(&'a str),
    /// Coerce through the store's typed float setter.
    AsFloat(&'a str),
    /// Coerce through the store's typed integer setter.
    AsInt(&'a str),
}

/// Outcome of `remove_value_from_list`: removing a value that is not in
/// the list is benign, not an error.
#[derive(Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Output modes for `get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON, the default human-readable rendering.
    Pretty,
    /// Compact single-line JSON.
    Json,
    /// Block-style YAML.
    Yaml,
    /// The string value verbatim, no quoting. Errors on non-strings.
    Raw,
}

/// Set the value at `path` and persist.
pub fn set_value(
    store: &mut dyn SettingsStore,
    path: &KeyPath,
    value: ValueArg<'_>,
) -> Result<(), ConfigError> {
    match value {
        ValueArg::Plain(v) => store.set(path, v)?,
        ValueArg::AsBool(raw) => store.set_bool(path, raw)?,
        ValueArg::AsFloat(raw) => store.set_float(path, raw)?,
        ValueArg::AsInt(raw) => store.set_int(path, raw)?,
    }
    store.save()
}

/// Remove the value at `path` and persist. Removing a path that was
/// never set still succeeds.
pub fn remove_path(store: &mut dyn SettingsStore, path: &KeyPath) -> Result<(), ConfigError> {
    store.remove(path)?;
    store.save()
}

/// Append `value` to the list at `path`, creating the list if the path
/// is unset, and persist.
pub fn append_to_list(
    store: &mut dyn SettingsStore,
    path: &KeyPath,
    value: Value,
) -> Result<(), ConfigError> {
    let mut items = current_list(store, path)?;
    items.push(value);
    store.set(path, Value::Array(items))?;
    store.save()
}

/// Insert `value` at `index` into the list at `path` and persist.
///
/// Index semantics follow conventional sequence insertion: an index past
/// the end appends, a negative index counts from the end (floored at the
/// front), and later elements shift right.
pub fn insert_into_list(
    store: &mut dyn SettingsStore,
    path: &KeyPath,
    index: i64,
    value: Value,
) -> Result<(), ConfigError> {
    let mut items = current_list(store, path)?;
    let at = clamp_insert_index(index, items.len());
    items.insert(at, value);
    store.set(path, Value::Array(items))?;
    store.save()
}

/// Remove the first occurrence of `value` from the list at `path` and
/// persist. A value that is not in the list is reported as `NotFound`
/// with no write performed.
pub fn remove_value_from_list(
    store: &mut dyn SettingsStore,
    path: &KeyPath,
    value: &Value,
) -> Result<RemoveOutcome, ConfigError> {
    let mut items = current_list(store, path)?;
    let Some(pos) = items.iter().position(|item| item == value) else {
        return Ok(RemoveOutcome::NotFound);
    };
    items.remove(pos);
    store.set(path, Value::Array(items))?;
    store.save()?;
    Ok(RemoveOutcome::Removed)
}

/// Render a retrieved value for printing. A missing path renders as
/// null in every format except `Raw`, which only accepts strings.
pub fn render(value: Option<&Value>, format: OutputFormat) -> Result<String, ConfigError> {
    let value = value.unwrap_or(&Value::Null);
    match format {
        OutputFormat::Pretty => {
            serde_json::to_string_pretty(value).map_err(|e| ConfigError::InvalidValue(e.to_string()))
        }
        OutputFormat::Json => {
            serde_json::to_string(value).map_err(|e| ConfigError::InvalidValue(e.to_string()))
        }
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .map_err(|e| ConfigError::InvalidValue(e.to_string())),
        OutputFormat::Raw => match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(ConfigError::InvalidValue(format!(
                "value is {}, not a string; --raw prints strings verbatim",
                type_name(other)
            ))),
        },
    }
}

/// Read the list at `path` from the overlay tier. Absence (or an
/// explicit null) is an empty list; anything else non-list is an error.
fn current_list(store: &dyn SettingsStore, path: &KeyPath) -> Result<Vec<Value>, ConfigError> {
    match store.get(path, false) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ConfigError::NotAList {
            path: path.to_string(),
            found: type_name(&other),
        }),
    }
}

fn clamp_insert_index(index: i64, len: usize) -> usize {
    let len = len as i64;
    let at = if index < 0 {
        (len + index).max(0)
    } else {
        index.min(len)
    };
    at as usize
}
