//! Configuration management for the event recording layer.
//!
//! This module provides configuration handling with:
//! - YAML support
//! - Programmatic construction through [`ConfigBuilder`]
//! - Validation and defaults

use crate::core::{GleanError, Result};
use serde::{Deserialize, Serialize};

/// Complete configuration for a Glean instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dispatcher configuration
    pub dispatcher: DispatcherConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Whether metrics may be recorded at all
    pub upload_enabled: bool,
    /// Enables test-only introspection APIs
    pub testing_mode: bool,
}

/// Dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Name of the worker thread
    pub thread_name: String,
    /// Maximum queued tasks, `None` for an unbounded queue
    pub queue_capacity: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set
    pub level: LogLevel,
    /// Include the event target in log lines
    pub with_target: bool,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dispatcher: DispatcherConfig::default(),
            logging: LoggingConfig::default(),
            upload_enabled: true,
            testing_mode: false,
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            thread_name: "glean.dispatcher".to_string(),
            queue_capacity: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            with_target: true,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.dispatcher.thread_name.trim().is_empty() {
            return Err(GleanError::config("dispatcher thread_name must not be empty"));
        }

        if self.dispatcher.queue_capacity == Some(0) {
            return Err(GleanError::config(
                "dispatcher queue_capacity must be greater than 0 when set",
            ));
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| GleanError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set the dispatcher thread name
    pub fn thread_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.dispatcher.thread_name = name.into();
        self
    }

    /// Bound the dispatcher queue
    pub fn queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.config.dispatcher.queue_capacity = capacity;
        self
    }

    /// Set log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Enable or disable recording
    pub fn upload_enabled(mut self, enabled: bool) -> Self {
        self.config.upload_enabled = enabled;
        self
    }

    /// Enable test-only APIs
    pub fn testing_mode(mut self, enabled: bool) -> Self {
        self.config.testing_mode = enabled;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dispatcher.thread_name, "glean.dispatcher");
        assert_eq!(config.dispatcher.queue_capacity, None);
        assert!(config.upload_enabled);
        assert!(!config.testing_mode);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = ConfigBuilder::new().queue_capacity(Some(0)).build();
        assert!(matches!(result, Err(GleanError::Config(_))));
    }

    #[test]
    fn test_log_level_strings() {
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::Trace.as_str(), "trace");
    }
}
