// Layered configuration store
// Dot-path addressed JSON tree: overlay file over application defaults.

pub mod file_store;
pub mod path;
pub mod store;

pub use file_store::FileStore;
pub use path::KeyPath;
pub use store::{ConfigError, SettingsStore};
