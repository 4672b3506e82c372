//! Source providers
//!
//! A source provider wraps one origin of configuration data (a file, the
//! process environment, or in-memory defaults) and produces a nested
//! [`Table`] of raw values addressed by dotted key paths. Providers are
//! read-only once loaded; the precedence resolver combines their output.

pub mod defaults;
pub mod env;
pub mod file;

pub use defaults::DefaultsProvider;
pub use env::EnvProvider;
pub use file::FileProvider;

use crate::error::ConfigError;
use crate::value::Table;

/// Provenance tag identifying the origin of a configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// In-memory defaults registered before the load
    Defaults,
    /// A configuration file
    File,
    /// Process environment variables
    Environment,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Defaults => "defaults",
            SourceKind::File => "file",
            SourceKind::Environment => "environment",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One origin of raw configuration values
pub trait Source {
    /// Provenance tag recorded in the merged tree for diagnostics
    fn kind(&self) -> SourceKind;

    /// Produce the nested table of raw values from this origin
    fn load(&self) -> Result<Table, ConfigError>;
}
