use std::collections::HashMap;
use std::env;
use thiserror::Error;

pub const ENV_AUTO_ALIAS: &str = "ELIF_CONTAINER_AUTO_ALIAS";
pub const ENV_FRAMEWORK_SERVICES: &str = "ELIF_CONTAINER_FRAMEWORK_SERVICES";
pub const ENV_STRICT_RESERVED: &str = "ELIF_CONTAINER_STRICT_RESERVED";
pub const ENV_MAX_DEPTH: &str = "ELIF_CONTAINER_MAX_DEPTH";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Environment variable error: {message}")]
    EnvironmentError { message: String },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create an environment error
    pub fn environment_error(message: impl Into<String>) -> Self {
        Self::EnvironmentError {
            message: message.into(),
        }
    }
}

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    EnvVar(String),
    Default(String),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::EnvVar(var) => write!(f, "env:{}", var),
            ConfigSource::Default(value) => write!(f, "default:{}", value),
        }
    }
}

/// Container behaviour switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Register an alias from a constructed value's runtime type to the requested id
    pub auto_alias: bool,
    /// Install the framework reserved services (`config`, `log`)
    pub framework_services: bool,
    /// Also validate factory and fixed-instance overrides of reserved services
    pub strict_reserved: bool,
    /// Deepest dependency chain a single `make` may walk
    pub max_resolution_depth: usize,
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self {
            auto_alias: true,
            framework_services: true,
            strict_reserved: false,
            max_resolution_depth: 256,
        }
    }

    /// Bare container: no implicit aliases, no reserved framework services
    pub fn minimal() -> Self {
        Self {
            auto_alias: false,
            framework_services: false,
            ..Self::new()
        }
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Some(value) = read_var(ENV_AUTO_ALIAS)? {
            config.auto_alias = parse_bool("auto_alias", &value)?;
        }

        if let Some(value) = read_var(ENV_FRAMEWORK_SERVICES)? {
            config.framework_services = parse_bool("framework_services", &value)?;
        }

        if let Some(value) = read_var(ENV_STRICT_RESERVED)? {
            config.strict_reserved = parse_bool("strict_reserved", &value)?;
        }

        if let Some(value) = read_var(ENV_MAX_DEPTH)? {
            config.max_resolution_depth =
                value.trim().parse().map_err(|_| {
                    ConfigError::invalid_value("max_resolution_depth", &value, "a positive integer")
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::invalid_value(
                "max_resolution_depth",
                "0",
                "a positive integer",
            ));
        }

        Ok(())
    }

    /// Report which source each field was read from
    pub fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let fields = [
            ("auto_alias", ENV_AUTO_ALIAS, "true"),
            ("framework_services", ENV_FRAMEWORK_SERVICES, "true"),
            ("strict_reserved", ENV_STRICT_RESERVED, "false"),
            ("max_resolution_depth", ENV_MAX_DEPTH, "256"),
        ];

        fields
            .iter()
            .map(|(field, var, default)| {
                let source = if env::var(var).is_ok() {
                    ConfigSource::EnvVar(var.to_string())
                } else {
                    ConfigSource::Default(default.to_string())
                };
                (field.to_string(), source)
            })
            .collect()
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_var(name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::environment_error(format!(
            "{} is not valid unicode",
            name
        ))),
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_value(field, value, "true or false")),
    }
}
