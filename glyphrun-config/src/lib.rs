//! Configuration system for glyphrun.
//!
//! This crate provides YAML configuration loading, saving, validation and
//! default values for font resolution, shaping and the glyph cache.

mod config;
pub mod defaults;
mod error;
mod types;

pub use config::{Config, MAX_FONT_SIZE, MIN_FONT_SIZE};
pub use error::ConfigError;
pub use types::{FontMatcher, LogLevel, StyleTable};
