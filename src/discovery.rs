//! Configuration file discovery
//!
//! Picks the single file to load for a logical configuration name. An
//! environment-specific overlay (`{base}-{environment}`) is preferred over
//! the bare base name, and that preference spans the whole search list: the
//! overlay is probed in every directory before the base name is probed in
//! any. Discovery never merges files; it picks exactly one path.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::environment::Environment;
use crate::error::ConfigError;

/// File extensions probed for each candidate name, in order
pub const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Default search directories, in declaration order
pub fn default_search_paths() -> Vec<PathBuf> {
    [".", "./etc", "../etc", "../../etc", "/etc/unidict"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

/// Find the configuration file for `base` under `search_paths`.
///
/// Within a tier the first directory holding a matching file wins, probing
/// `.yaml` before `.yml` in each directory. Returns
/// [`ConfigError::FileNotFound`] when neither the overlay nor the base name
/// exists anywhere.
pub fn locate(
    search_paths: &[PathBuf],
    base: &str,
    environment: Environment,
) -> Result<PathBuf, ConfigError> {
    let overlay = format!("{base}-{environment}");
    if let Some(path) = find_in_paths(search_paths, &overlay) {
        debug!(path = %path.display(), "using environment-specific configuration file");
        return Ok(path);
    }
    if let Some(path) = find_in_paths(search_paths, base) {
        debug!(
            path = %path.display(),
            environment = %environment,
            "environment-specific file absent, using base configuration file"
        );
        return Ok(path);
    }
    Err(ConfigError::file_not_found(format!(
        "no `{overlay}` or `{base}` (.yaml/.yml) under {}",
        render_paths(search_paths)
    )))
}

fn find_in_paths(search_paths: &[PathBuf], name: &str) -> Option<PathBuf> {
    for dir in search_paths {
        for ext in CONFIG_EXTENSIONS {
            let candidate = dir.join(format!("{name}.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

fn render_paths(search_paths: &[PathBuf]) -> String {
    search_paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve an explicitly given path, substituting the environment-specific
/// sibling (`{dir}/{stem}-{environment}{ext}`) when the exact path is
/// missing and that sibling exists. Otherwise the original path is returned
/// untouched and the read step reports it missing.
pub fn resolve_explicit(path: &Path, environment: Environment) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return path.to_path_buf();
    };
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let sibling = path.with_file_name(format!("{stem}-{environment}{ext}"));
    if sibling.exists() {
        debug!(path = %sibling.display(), "substituting environment-specific sibling file");
        sibling
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dir_with(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in files {
            std::fs::write(dir.path().join(name), "name: test\n").unwrap();
        }
        dir
    }

    #[test]
    fn test_overlay_preferred_in_same_directory() {
        let dir = dir_with(&["app.yaml", "app-production.yaml"]);
        let found = locate(
            &[dir.path().to_path_buf()],
            "app",
            Environment::Production,
        )
        .unwrap();
        assert_eq!(found, dir.path().join("app-production.yaml"));
    }

    #[test]
    fn test_overlay_in_later_directory_beats_base_in_earlier() {
        // The overlay tier spans all directories before the base tier is
        // consulted at all.
        let first = dir_with(&["app.yaml"]);
        let second = dir_with(&["app-production.yaml"]);
        let found = locate(
            &[first.path().to_path_buf(), second.path().to_path_buf()],
            "app",
            Environment::Production,
        )
        .unwrap();
        assert_eq!(found, second.path().join("app-production.yaml"));
    }

    #[test]
    fn test_first_directory_wins_within_a_tier() {
        let first = dir_with(&["app-production.yaml"]);
        let second = dir_with(&["app-production.yaml"]);
        let found = locate(
            &[first.path().to_path_buf(), second.path().to_path_buf()],
            "app",
            Environment::Production,
        )
        .unwrap();
        assert_eq!(found, first.path().join("app-production.yaml"));
    }

    #[test]
    fn test_base_fallback_when_no_overlay_exists() {
        let dir = dir_with(&["app.yaml"]);
        let found = locate(
            &[dir.path().to_path_buf()],
            "app",
            Environment::Production,
        )
        .unwrap();
        assert_eq!(found, dir.path().join("app.yaml"));
    }

    #[test]
    fn test_yaml_probed_before_yml() {
        let dir = dir_with(&["app.yaml", "app.yml"]);
        let found = locate(&[dir.path().to_path_buf()], "app", Environment::Development).unwrap();
        assert_eq!(found, dir.path().join("app.yaml"));
    }

    #[test]
    fn test_yml_found_when_yaml_absent() {
        let dir = dir_with(&["app.yml"]);
        let found = locate(&[dir.path().to_path_buf()], "app", Environment::Development).unwrap();
        assert_eq!(found, dir.path().join("app.yml"));
    }

    #[test]
    fn test_nothing_found_is_not_found_error() {
        let dir = dir_with(&[]);
        let err = locate(
            &[dir.path().to_path_buf()],
            "app",
            Environment::Staging,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
        let rendered = err.to_string();
        assert!(rendered.contains("app-staging"), "{rendered}");
        assert!(rendered.contains("app"), "{rendered}");
    }

    #[test]
    fn test_resolve_explicit_existing_path_kept() {
        let dir = dir_with(&["gateway.yaml", "gateway-production.yaml"]);
        let path = dir.path().join("gateway.yaml");
        assert_eq!(
            resolve_explicit(&path, Environment::Production),
            path,
            "an existing path is never substituted"
        );
    }

    #[test]
    fn test_resolve_explicit_substitutes_existing_sibling() {
        let dir = dir_with(&["gateway-production.yaml"]);
        let path = dir.path().join("gateway.yaml");
        assert_eq!(
            resolve_explicit(&path, Environment::Production),
            dir.path().join("gateway-production.yaml")
        );
    }

    #[test]
    fn test_resolve_explicit_missing_sibling_defers() {
        let dir = dir_with(&[]);
        let path = dir.path().join("gateway.yaml");
        assert_eq!(resolve_explicit(&path, Environment::Production), path);
    }

    #[test]
    fn test_resolve_explicit_extensionless_path() {
        let dir = dir_with(&[]);
        std::fs::write(dir.path().join("gateway-testing"), "name: t\n").unwrap();
        let path = dir.path().join("gateway");
        assert_eq!(
            resolve_explicit(&path, Environment::Testing),
            dir.path().join("gateway-testing")
        );
    }
}
