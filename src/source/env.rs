//! Environment variable source provider

use crate::error::ConfigError;
use crate::source::{Source, SourceKind};
use crate::value::{self, Table, Value};

/// Prefix carried by environment variables that feed configuration
pub const ENV_PREFIX: &str = "UNIDICT_";

/// Exposes `UNIDICT_`-prefixed environment variables as a nested table
///
/// The variable set is snapshotted at construction; variables set afterwards
/// are not visible to this provider. The prefix is stripped, the remainder
/// is lowercased, and `_` separators become `.`, so `UNIDICT_DATABASE_HOST`
/// yields the key path `database.host`. All values enter as strings; the
/// typed decoder performs coercion.
#[derive(Debug, Clone)]
pub struct EnvProvider {
    vars: Vec<(String, String)>,
}

impl EnvProvider {
    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build a provider over a fixed variable set, bypassing the process
    /// environment. Intended for tests and embedders with their own
    /// variable source.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }
}

impl Source for EnvProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::Environment
    }

    fn load(&self) -> Result<Table, ConfigError> {
        let mut table = Table::new();
        for (name, raw) in &self.vars {
            let Some(rest) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let path = rest.to_ascii_lowercase().replace('_', ".");
            value::insert_path(&mut table, &path, Value::String(raw.clone()));
        }
        Ok(table)
    }
}
