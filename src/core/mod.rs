//! Core types shared by every part of the recording layer.
//!
//! Errors, configuration and the monotonic clock live here.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod time;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, DispatcherConfig, LogLevel, LoggingConfig};
pub use error::{GleanError, Result};
pub use time::monotonic_millis;
