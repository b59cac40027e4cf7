//! Typed error variants for the glyphrun-config crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use glyphrun_config::{Config, ConfigError};
//!
//! match Config::load() {
//!     Ok(config) => println!("font: {}", config.font_family),
//!     Err(ConfigError::Io(io)) => eprintln!("I/O error: {io}"),
//!     Err(ConfigError::Parse(p)) => eprintln!("YAML parse error: {p}"),
//!     Err(ConfigError::Validation(msg)) => eprintln!("Validation: {msg}"),
//! }
//! ```

use thiserror::Error;

/// Errors that can occur when loading, validating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file contained invalid YAML that could not be parsed.
    #[error("YAML parse error in config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string describes which field is invalid and why.
    #[error("Config validation error: {0}")]
    Validation(String),
}
