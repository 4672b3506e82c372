//! Configuration manager façade

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::de;
use crate::discovery;
use crate::environment::Environment;
use crate::error::ConfigError;
use crate::merge::{self, Layer, MergedTree};
use crate::source::{DefaultsProvider, EnvProvider, FileProvider, Source, SourceKind};
use crate::value::Value;

/// Resolves layered configuration for one process
///
/// The active environment is read from `UNIDICT_ENV` once at construction
/// and never changes for the manager's lifetime. Every load performs a fresh
/// discovery, merge, and decode; the merged tree of the most recent
/// completed load backs the raw getters, and it is published only after the
/// merge has fully finished, so readers never observe a partially-merged
/// state. The manager is single-writer: callers needing concurrent mutating
/// use must synchronize externally or construct one manager per thread.
#[derive(Debug)]
pub struct ConfigManager {
    environment: Environment,
    search_paths: Vec<PathBuf>,
    defaults: RwLock<DefaultsProvider>,
    tree: RwLock<Option<MergedTree>>,
}

impl ConfigManager {
    /// Create a manager for the environment named by `UNIDICT_ENV`.
    pub fn new() -> Self {
        Self::with_environment(Environment::from_env())
    }

    /// Create a manager with an explicit environment.
    pub fn with_environment(environment: Environment) -> Self {
        Self {
            environment,
            search_paths: discovery::default_search_paths(),
            defaults: RwLock::new(DefaultsProvider::new()),
            tree: RwLock::new(None),
        }
    }

    /// Replace the directories probed during discovery.
    pub fn with_search_paths(mut self, search_paths: Vec<PathBuf>) -> Self {
        self.search_paths = search_paths;
        self
    }

    /// Active environment, fixed at construction.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Register a default value at a dotted key path.
    ///
    /// Defaults sit below file and environment values in precedence and
    /// apply to loads performed after the call.
    pub fn set_default(&self, key: &str, value: impl Into<Value>) {
        self.defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(key, value);
    }

    /// Resolve configuration for a logical name into a typed structure.
    ///
    /// Discovery picks the file (the `{name}-{environment}` overlay is
    /// preferred across the whole search path), then registered defaults,
    /// the file, and `UNIDICT_` environment variables merge in ascending
    /// precedence, and the merged tree decodes into `T`.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T, ConfigError> {
        let path = discovery::locate(&self.search_paths, name, self.environment)?;
        let defaults = self
            .defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let file = FileProvider::new(path);
        let env = EnvProvider::from_process();
        let layers = vec![
            (defaults.kind(), defaults.load()?),
            (file.kind(), file.load()?),
            (env.kind(), env.load()?),
        ];
        self.finish_load(layers)
    }

    /// Resolve configuration from an explicit file path.
    ///
    /// When the exact path is missing, an existing environment-specific
    /// sibling (`{stem}-{environment}{ext}`) is substituted before the read.
    /// Only the file and `UNIDICT_` environment variables participate;
    /// registered defaults are not consulted in this mode.
    pub fn load_path<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> Result<T, ConfigError> {
        let path = discovery::resolve_explicit(path.as_ref(), self.environment);
        let file = FileProvider::new(path);
        let env = EnvProvider::from_process();
        let layers = vec![(file.kind(), file.load()?), (env.kind(), env.load()?)];
        self.finish_load(layers)
    }

    fn finish_load<T: DeserializeOwned>(&self, layers: Vec<Layer>) -> Result<T, ConfigError> {
        let merged = merge::resolve(layers);
        let root = merged.root().clone();
        // Publish the tree before decoding so the raw getters reflect the
        // completed merge even when the decode below fails.
        *self.tree.write().unwrap_or_else(PoisonError::into_inner) = Some(merged);
        let decoded = de::decode(root)?;
        debug!(environment = %self.environment, "configuration resolved");
        Ok(decoded)
    }

    /// Raw value at a dotted key path from the most recent completed load.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.with_tree(|tree| tree.get(key).cloned())
    }

    /// String at a key path; scalars render to their display form.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.with_tree(|tree| tree.get_string(key))
    }

    /// Integer at a key path; strings parse strictly.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.with_tree(|tree| tree.get_int(key))
    }

    /// Boolean at a key path; accepts `true`/`false`, `1`/`0`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.with_tree(|tree| tree.get_bool(key))
    }

    /// Which source supplied the winning value at a leaf key path.
    pub fn origin(&self, key: &str) -> Option<SourceKind> {
        self.with_tree(|tree| tree.origin(key))
    }

    fn with_tree<R>(&self, read: impl FnOnce(&MergedTree) -> Option<R>) -> Option<R> {
        let guard = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().and_then(read)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
