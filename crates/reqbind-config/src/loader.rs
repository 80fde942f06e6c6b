//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading [`BindConfig`] from
//! defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use reqbind::{BindConfig, Binder};

use crate::ConfigError;

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use reqbind_config::ConfigLoader;
///
/// # fn main() -> Result<(), reqbind_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("reqbind.toml")?
///     .with_env_prefix("REQBIND")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: BindConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: BindConfig::default(),
            env_prefix: None,
        }
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats, chosen by extension.
    /// Keys missing from the file keep their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        tracing::debug!(path = %path.display(), "loaded binder configuration file");

        Ok(self)
    }

    /// Load configuration from an optional file.
    ///
    /// If the file exists, loads it. If not, silently continues.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            tracing::debug!(path = %path.as_ref().display(), "no binder configuration file, using defaults");
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// `format` is `"toml"` or `"json"`, case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use reqbind_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("vacuum = true", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.vacuum);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::unsupported_format(format)),
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Recognized variables, for prefix `REQBIND`:
    /// - `REQBIND__VACUUM`
    /// - `REQBIND__MAX_BODY_SIZE`
    /// - `REQBIND__MAX_MULTIPART_FIELDS`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or a limit is
    /// zero.
    pub fn load(mut self) -> Result<BindConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_vars(&prefix, env::vars())?;
        }

        validate(&self.config)?;
        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> BindConfig {
        self.config
    }

    /// Loads the configuration and builds a [`Binder`] from it.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_binder(self) -> Result<Binder, ConfigError> {
        let config = self.load()?;
        Ok(Binder::builder().config(config).build())
    }

    fn parse_file(content: &str, path: &Path) -> Result<BindConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::unsupported_format(path.display().to_string())),
        }
    }

    fn apply_env_vars<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars.into_iter().filter(|(k, _)| k.starts_with(prefix)) {
            self.apply_env_var(&key, &value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(name) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            // another variable sharing the prefix, e.g. REQBIND_HOME
            return Ok(());
        };

        match name {
            "VACUUM" => {
                self.config.vacuum = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            "MAX_BODY_SIZE" => {
                self.config.max_body_size = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            "MAX_MULTIPART_FIELDS" => {
                self.config.max_multipart_fields = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            _ => {
                tracing::debug!(var = key, "ignoring unknown binder environment variable");
                return Ok(());
            }
        }

        tracing::debug!(var = key, "applied binder environment override");
        Ok(())
    }
}

/// Checks that the loaded limits are usable.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for a zero limit.
pub fn validate(config: &BindConfig) -> Result<(), ConfigError> {
    if config.max_body_size == 0 {
        return Err(ConfigError::invalid_value(
            "max_body_size",
            "must be greater than zero",
        ));
    }
    if config.max_multipart_fields == 0 {
        return Err(ConfigError::invalid_value(
            "max_multipart_fields",
            "must be greater than zero",
        ));
    }
    Ok(())
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
