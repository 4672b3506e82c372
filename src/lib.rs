//! Layered configuration resolution for UniDict services.
//!
//! Configuration is assembled from three sources with a fixed precedence:
//! environment variables override values from a YAML file, which override
//! registered defaults. Files are discovered by probing a set of search
//! directories for an environment overlay (`{name}-{environment}.yaml`)
//! before the base file (`{name}.yaml`). The merged tree keeps per-key
//! provenance and is decoded into caller-defined structs through serde.
//!
//! ```no_run
//! use serde::Deserialize;
//! use unidict_config::{ConfigError, ConfigManager};
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct Settings {
//!     name: String,
//!     port: u16,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let manager = ConfigManager::new();
//!     let settings: Settings = manager.load("config")?;
//!     println!("{} listens on port {}", settings.name, settings.port);
//!     Ok(())
//! }
//! ```

use std::path::Path;
use std::sync::OnceLock;

use serde::de::DeserializeOwned;

pub mod de;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod manager;
pub mod merge;
pub mod settings;
pub mod source;
pub mod validation;
pub mod value;

pub use environment::Environment;
pub use error::ConfigError;
pub use manager::ConfigManager;
pub use merge::MergedTree;
pub use settings::ServiceSettings;
pub use source::SourceKind;
pub use value::{Table, Value};

static GLOBAL_MANAGER: OnceLock<ConfigManager> = OnceLock::new();

/// Return the process-wide [`ConfigManager`], creating it on first use.
///
/// The manager's environment is read from `UNIDICT_ENV` once, when this is
/// first called, and never changes afterwards.
pub fn init() -> &'static ConfigManager {
    GLOBAL_MANAGER.get_or_init(ConfigManager::new)
}

/// Load configuration from an explicit file path through the global manager.
///
/// The path is used as given when it exists; otherwise an environment
/// sibling next to it (`{stem}-{environment}{ext}`) is tried before giving
/// up. Environment variables still override the file contents.
pub fn load_service_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    init().load_path(path)
}

/// The environment the global manager resolved at first use.
pub fn current_environment() -> Environment {
    init().environment()
}
