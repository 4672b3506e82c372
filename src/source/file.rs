//! YAML file source provider

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;
use crate::source::{Source, SourceKind};
use crate::value::{self, Table, Value};

/// Reads one YAML document and exposes it as a nested table
///
/// Mapping keys are lowercased during conversion. An empty or null document
/// is an empty table; a document whose root is not a mapping is a parse
/// error.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileProvider {
    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn load(&self) -> Result<Table, ConfigError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|err| {
            ConfigError::file_not_found(format!("{}: {}", self.path.display(), err))
        })?;
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::ParseError {
                path: self.path.display().to_string(),
                source,
            })?;
        let table = match value::from_yaml(yaml) {
            Value::Table(table) => table,
            Value::Null => Table::new(),
            other => {
                return Err(ConfigError::ParseError {
                    path: self.path.display().to_string(),
                    source: serde::de::Error::custom(format!(
                        "root of the document must be a mapping, found {}",
                        other.type_name()
                    )),
                });
            }
        };
        debug!(path = %self.path.display(), keys = table.len(), "loaded configuration file");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::get_path;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_nested_document() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "app.yaml",
            "name: gateway\ndatabase:\n  host: db.internal\n  port: 5432\n",
        );

        let table = FileProvider::new(path).load().unwrap();
        assert_eq!(get_path(&table, "name"), Some(&Value::from("gateway")));
        assert_eq!(
            get_path(&table, "database.host"),
            Some(&Value::from("db.internal"))
        );
        assert_eq!(get_path(&table, "database.port"), Some(&Value::Int(5432)));
    }

    #[test]
    fn test_load_lowercases_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "app.yaml", "Database:\n  Host: x\n");

        let table = FileProvider::new(path).load().unwrap();
        assert_eq!(get_path(&table, "database.host"), Some(&Value::from("x")));
    }

    #[test]
    fn test_load_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "app.yaml", "");

        let table = FileProvider::new(path).load().unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = FileProvider::new(dir.path().join("absent.yaml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
        assert_eq!(err.stage(), "discovery");
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "app.yaml", "database: [unclosed\n");

        let err = FileProvider::new(path).load().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert_eq!(err.stage(), "parse");
        assert!(err.to_string().contains("app.yaml"));
    }

    #[test]
    fn test_scalar_root_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "app.yaml", "just a string\n");

        let err = FileProvider::new(path).load().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("app.yaml"));
    }

    #[test]
    fn test_provider_kind() {
        assert_eq!(FileProvider::new("x.yaml").kind(), SourceKind::File);
    }
}
