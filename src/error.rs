//! Error types for configuration loading

use thiserror::Error;

/// Errors produced while resolving configuration
///
/// Every load stage reports failures through this type. The failing stage is
/// intrinsic to the variant and available through [`ConfigError::stage`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No configuration file matched during discovery, or a file could not
    /// be read
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// A configuration file exists but is not a valid YAML mapping document
    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A merged value exists but cannot be coerced into the target field's
    /// type
    #[error("Failed to decode configuration{}: {message}", key_suffix(.path))]
    DecodeError { path: String, message: String },

    /// A decoded settings value failed a semantic check
    #[error("Invalid value for {field}: {message}")]
    ValidationError { field: String, message: String },
}

fn key_suffix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" key `{path}`")
    }
}

impl ConfigError {
    /// Create a file-not-found error
    pub fn file_not_found(message: impl Into<String>) -> Self {
        Self::FileNotFound(message.into())
    }

    /// Create a decode error for a dotted key path
    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DecodeError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Label of the load stage this error originated from
    pub fn stage(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound(_) => "discovery",
            ConfigError::ParseError { .. } => "parse",
            ConfigError::DecodeError { .. } => "decode",
            ConfigError::ValidationError { .. } => "validation",
        }
    }

    /// Fill in the key path of a decode error minted without one.
    ///
    /// Errors raised by serde itself (missing fields, invalid lengths) start
    /// with an empty path; the decoder back-fills the nearest known path as
    /// they propagate outward. Errors that already carry a path keep it.
    pub(crate) fn with_path(self, path: &str) -> Self {
        match self {
            ConfigError::DecodeError { path: p, message } if p.is_empty() && !path.is_empty() => {
                ConfigError::DecodeError {
                    path: path.to_string(),
                    message,
                }
            }
            other => other,
        }
    }
}

impl serde::de::Error for ConfigError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ConfigError::DecodeError {
            path: String::new(),
            message: msg.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        assert_eq!(ConfigError::file_not_found("x").stage(), "discovery");
        assert_eq!(ConfigError::decode("a.b", "bad").stage(), "decode");
        assert_eq!(ConfigError::validation("f", "m").stage(), "validation");

        let parse = ConfigError::ParseError {
            path: "etc/app.yaml".to_string(),
            source: serde_yaml::from_str::<serde_yaml::Value>("key: [unclosed").unwrap_err(),
        };
        assert_eq!(parse.stage(), "parse");
    }

    #[test]
    fn test_decode_display_names_path_and_value() {
        let err = ConfigError::decode("database.port", "invalid integer `abc`");
        let rendered = err.to_string();
        assert!(rendered.contains("database.port"), "{rendered}");
        assert!(rendered.contains("abc"), "{rendered}");
    }

    #[test]
    fn test_decode_display_without_path() {
        let err = ConfigError::decode("", "missing field `secret`");
        assert_eq!(
            err.to_string(),
            "Failed to decode configuration: missing field `secret`"
        );
    }

    #[test]
    fn test_with_path_fills_empty_path_only() {
        let filled = ConfigError::decode("", "boom").with_path("database");
        assert!(matches!(
            &filled,
            ConfigError::DecodeError { path, .. } if path == "database"
        ));

        let kept = ConfigError::decode("redis.port", "boom").with_path("database");
        assert!(matches!(
            &kept,
            ConfigError::DecodeError { path, .. } if path == "redis.port"
        ));
    }

    #[test]
    fn test_serde_error_custom() {
        let err = <ConfigError as serde::de::Error>::custom("unexpected thing");
        assert!(matches!(
            &err,
            ConfigError::DecodeError { path, message } if path.is_empty() && message == "unexpected thing"
        ));
    }

    #[test]
    fn test_validation_display() {
        let err = ConfigError::validation("database.port", "Port must be non-zero.");
        assert_eq!(
            err.to_string(),
            "Invalid value for database.port: Port must be non-zero."
        );
    }
}
