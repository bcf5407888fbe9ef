// Strata CLI - headless operations on the layered configuration store
// Paths are dot-separated ("server.port"); data goes to stdout,
// diagnostics to stderr.

mod editor;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;

use strata_config::{ConfigError, FileStore, KeyPath, SettingsStore};

use editor::{OutputFormat, RemoveOutcome, ValueArg};
use exit_codes::{config_exit_code, EXIT_STORE_INIT, EXIT_SUCCESS, EXIT_VALUE_PARSE};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Layered configuration store (CLI mode, headless)")]
#[command(version)]
struct Cli {
    /// Overlay config file (default: ~/.config/strata/config.json)
    #[arg(long, short = 'c', env = "STRATA_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the value at the given path
    #[command(after_help = "\
Examples:
  strata set server.host 10.0.0.1
  strata set server.port 5000 --int
  strata set webcam.flipH true --bool
  strata set server '{\"host\": \"::\", \"port\": 5000}' --json")]
    Set {
        /// Dot-separated settings path
        path: String,

        /// Value to store
        value: String,

        /// Interpret value as bool
        #[arg(long = "bool", group = "coerce")]
        as_bool: bool,

        /// Interpret value as float
        #[arg(long = "float", group = "coerce")]
        as_float: bool,

        /// Interpret value as int
        #[arg(long = "int", group = "coerce")]
        as_int: bool,

        /// Parse value from JSON
        #[arg(long = "json", group = "coerce")]
        as_json: bool,
    },

    /// Remove the value at the given path
    Remove {
        /// Dot-separated settings path
        path: String,
    },

    /// Append a value to the list at the given path
    #[command(name = "append_value")]
    #[command(after_help = "\
Examples:
  strata append_value api.allowlist 10.0.0.0/8
  strata append_value printers '{\"name\": \"left\"}' --json")]
    AppendValue {
        /// Dot-separated settings path
        path: String,

        /// Value to append
        value: String,

        /// Parse value from JSON
        #[arg(long = "json")]
        as_json: bool,
    },

    /// Insert a value at the given index of the list at the given path
    #[command(name = "insert_value")]
    InsertValue {
        /// Dot-separated settings path
        path: String,

        /// Zero-based index; past-the-end appends, negative counts from the end
        #[arg(allow_hyphen_values = true)]
        index: i64,

        /// Value to insert
        value: String,

        /// Parse value from JSON
        #[arg(long = "json")]
        as_json: bool,
    },

    /// Remove the first matching value from the list at the given path
    #[command(name = "remove_value")]
    RemoveValue {
        /// Dot-separated settings path
        path: String,

        /// Value to remove
        value: String,

        /// Parse value from JSON
        #[arg(long = "json")]
        as_json: bool,
    },

    /// Print the value at the given path
    #[command(after_help = "\
Examples:
  strata get server.port --json
  strata get api --yaml
  strata get server.host --raw")]
    Get {
        /// Dot-separated settings path
        path: String,

        /// Output value formatted as JSON
        #[arg(long, group = "format")]
        json: bool,

        /// Output value formatted as YAML
        #[arg(long, group = "format")]
        yaml: bool,

        /// Output value as raw string (strings only)
        #[arg(long, group = "format")]
        raw: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: strata <command> [options]");
            eprintln!("       strata --help for more information");
            Ok(())
        }
        Some(Commands::Set { path, value, as_bool, as_float, as_int, as_json }) => {
            cmd_set(cli.config, path, value, as_bool, as_float, as_int, as_json)
        }
        Some(Commands::Remove { path }) => cmd_remove(cli.config, path),
        Some(Commands::AppendValue { path, value, as_json }) => {
            cmd_append_value(cli.config, path, value, as_json)
        }
        Some(Commands::InsertValue { path, index, value, as_json }) => {
            cmd_insert_value(cli.config, path, index, value, as_json)
        }
        Some(Commands::RemoveValue { path, value, as_json }) => {
            cmd_remove_value(cli.config, path, value, as_json)
        }
        Some(Commands::Get { path, json, yaml, raw }) => {
            cmd_get(cli.config, path, json, yaml, raw)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn value_parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_VALUE_PARSE, message: msg.into(), hint: None }
    }

    /// Store error with its registry exit code.
    fn store(err: ConfigError) -> Self {
        Self { code: config_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Store failed to initialize - fatal startup condition, reported
    /// with both the underlying message and a generic fatal notice.
    fn store_init(err: ConfigError) -> Self {
        Self {
            code: EXIT_STORE_INIT,
            message: err.to_string(),
            hint: Some("there was a fatal error initializing the settings store".to_string()),
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn open_store(config: Option<PathBuf>) -> Result<FileStore, CliError> {
    let path = config.unwrap_or_else(FileStore::default_path);
    FileStore::open(path).map_err(CliError::store_init)
}

/// Build the stored value from the raw argument: JSON-parsed under
/// `--json`, the text itself otherwise.
fn parse_cli_value(raw: &str, as_json: bool) -> Result<Value, CliError> {
    if as_json {
        serde_json::from_str(raw)
            .map_err(|e| CliError::value_parse(format!("invalid JSON value: {}", e)))
    } else {
        Ok(Value::String(raw.to_string()))
    }
}

// ============================================================================
// set / remove
// ============================================================================

fn cmd_set(
    config: Option<PathBuf>,
    path: String,
    value: String,
    as_bool: bool,
    as_float: bool,
    as_int: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let mut store = open_store(config)?;
    let path = KeyPath::parse(&path);

    let arg = if as_bool {
        ValueArg::AsBool(&value)
    } else if as_float {
        ValueArg::AsFloat(&value)
    } else if as_int {
        ValueArg::AsInt(&value)
    } else {
        ValueArg::Plain(parse_cli_value(&value, as_json)?)
    };

    editor::set_value(&mut store, &path, arg).map_err(CliError::store)
}

fn cmd_remove(config: Option<PathBuf>, path: String) -> Result<(), CliError> {
    let mut store = open_store(config)?;
    editor::remove_path(&mut store, &KeyPath::parse(&path)).map_err(CliError::store)
}

// ============================================================================
// list operations
// ============================================================================

fn cmd_append_value(
    config: Option<PathBuf>,
    path: String,
    value: String,
    as_json: bool,
) -> Result<(), CliError> {
    let mut store = open_store(config)?;
    let value = parse_cli_value(&value, as_json)?;
    editor::append_to_list(&mut store, &KeyPath::parse(&path), value).map_err(CliError::store)
}

fn cmd_insert_value(
    config: Option<PathBuf>,
    path: String,
    index: i64,
    value: String,
    as_json: bool,
) -> Result<(), CliError> {
    let mut store = open_store(config)?;
    let value = parse_cli_value(&value, as_json)?;
    editor::insert_into_list(&mut store, &KeyPath::parse(&path), index, value)
        .map_err(CliError::store)
}

fn cmd_remove_value(
    config: Option<PathBuf>,
    path: String,
    value: String,
    as_json: bool,
) -> Result<(), CliError> {
    let mut store = open_store(config)?;
    let path = KeyPath::parse(&path);
    let value = parse_cli_value(&value, as_json)?;

    match editor::remove_value_from_list(&mut store, &path, &value).map_err(CliError::store)? {
        RemoveOutcome::Removed => {}
        RemoveOutcome::NotFound => {
            println!("value is not contained in the list at '{}'", path);
        }
    }
    Ok(())
}

// ============================================================================
// get
// ============================================================================

fn cmd_get(
    config: Option<PathBuf>,
    path: String,
    json: bool,
    yaml: bool,
    raw: bool,
) -> Result<(), CliError> {
    let store = open_store(config)?;
    let path = KeyPath::parse(&path);

    let format = if json {
        OutputFormat::Json
    } else if yaml {
        OutputFormat::Yaml
    } else if raw {
        OutputFormat::Raw
    } else {
        OutputFormat::Pretty
    };

    let value = store.get(&path, true);
    let output = editor::render(value.as_ref(), format).map_err(|e| {
        CliError::store(e).with_hint("non-string values have no raw form; use --json or --yaml")
    })?;
    println!("{}", output);
    Ok(())
}
