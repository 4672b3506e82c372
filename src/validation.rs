//! Settings validation
//!
//! Structural checks applied after decoding. Each settings section exposes
//! a `validate` method returning the first violation as a
//! [`ConfigError::ValidationError`]; [`ServiceSettings::validate`] walks
//! every section. Field names in errors are the dotted configuration keys,
//! so a failure reads the same way the offending key would be set.

use crate::environment::Environment;
use crate::error::ConfigError;
use crate::settings::{
    DatabaseSettings, EtcdSettings, JwtSettings, LogSettings, RedisSettings, ServiceSettings,
};

/// Accepted libpq `sslmode` values.
pub const VALID_SSL_MODES: &[&str] = &[
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

/// Accepted log levels.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Accepted log formats.
pub const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

/// Accepted log destinations.
pub const VALID_LOG_OUTPUTS: &[&str] = &["stdout", "stderr", "file"];

impl ServiceSettings {
    /// Validate the whole settings tree, stopping at the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::validation("name", "must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::validation("port", "must not be zero"));
        }
        self.database.validate()?;
        self.redis.validate()?;
        self.etcd.validate()?;
        self.log.validate()?;
        self.jwt.validate(self.environment)?;
        Ok(())
    }
}

impl DatabaseSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::validation("database.host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::validation("database.port", "must not be zero"));
        }
        if self.max_open == 0 {
            return Err(ConfigError::validation(
                "database.max_open",
                "must not be zero",
            ));
        }
        if self.max_idle > self.max_open {
            return Err(ConfigError::validation(
                "database.max_idle",
                format!(
                    "must not exceed max_open ({} > {})",
                    self.max_idle, self.max_open
                ),
            ));
        }
        if !VALID_SSL_MODES.contains(&self.ssl_mode.as_str()) {
            return Err(ConfigError::validation(
                "database.ssl_mode",
                format!(
                    "`{}` is not valid, must be one of: {}",
                    self.ssl_mode,
                    VALID_SSL_MODES.join(", ")
                ),
            ));
        }
        Ok(())
    }
}

impl RedisSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::validation("redis.host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::validation("redis.port", "must not be zero"));
        }
        if self.pool_size == 0 {
            return Err(ConfigError::validation(
                "redis.pool_size",
                "must not be zero",
            ));
        }
        Ok(())
    }
}

impl EtcdSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::validation(
                "etcd.endpoints",
                "must list at least one endpoint",
            ));
        }
        if self.timeout == 0 {
            return Err(ConfigError::validation("etcd.timeout", "must not be zero"));
        }
        Ok(())
    }
}

impl LogSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.as_str()) {
            return Err(ConfigError::validation(
                "log.level",
                format!(
                    "`{}` is not valid, must be one of: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }
        if !VALID_LOG_FORMATS.contains(&self.format.as_str()) {
            return Err(ConfigError::validation(
                "log.format",
                format!(
                    "`{}` is not valid, must be one of: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }
        if !VALID_LOG_OUTPUTS.contains(&self.output.as_str()) {
            return Err(ConfigError::validation(
                "log.output",
                format!(
                    "`{}` is not valid, must be one of: {}",
                    self.output,
                    VALID_LOG_OUTPUTS.join(", ")
                ),
            ));
        }
        if self.max_size == 0 {
            return Err(ConfigError::validation("log.max_size", "must not be zero"));
        }
        Ok(())
    }
}

impl JwtSettings {
    /// Validate token settings. The signing secret may stay empty during
    /// development but is required everywhere else.
    pub fn validate(&self, environment: Environment) -> Result<(), ConfigError> {
        if self.expire_time <= 0 {
            return Err(ConfigError::validation(
                "jwt.expire_time",
                "must be positive",
            ));
        }
        if self.secret.is_empty() && environment != Environment::Development {
            return Err(ConfigError::validation(
                "jwt.secret",
                format!("must not be empty in the {} environment", environment),
            ));
        }
        Ok(())
    }
}
