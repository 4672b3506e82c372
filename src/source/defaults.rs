//! In-memory defaults source provider

use crate::error::ConfigError;
use crate::source::{Source, SourceKind};
use crate::value::{self, Table, Value};

/// Holds default values registered before a load
///
/// Defaults sit at the bottom of the precedence order; any file or
/// environment value for the same key path wins over them.
#[derive(Debug, Clone, Default)]
pub struct DefaultsProvider {
    root: Table,
}

impl DefaultsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a default at a dotted key path, replacing any earlier
    /// default for the same path.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        value::insert_path(&mut self.root, key, value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl Source for DefaultsProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::Defaults
    }

    fn load(&self) -> Result<Table, ConfigError> {
        Ok(self.root.clone())
    }
}
