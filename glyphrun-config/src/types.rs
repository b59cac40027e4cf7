//! Enum and small struct types referenced by [`Config`](crate::Config).

use serde::{Deserialize, Serialize};

/// Log verbosity.
///
/// `RUST_LOG` and the `--log-level` CLI flag take precedence over the
/// configured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    #[default]
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Which font matching facility resolves family patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FontMatcher {
    /// Query the fonts installed on the system
    #[default]
    System,
    /// Use the fixed `style_table` paths; the family name is ignored
    StyleTable,
}

/// Fixed style-to-file mapping used with [`FontMatcher::StyleTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleTable {
    #[serde(default = "crate::defaults::style_regular")]
    pub regular: String,
    #[serde(default = "crate::defaults::style_bold")]
    pub bold: String,
    #[serde(default = "crate::defaults::style_italic")]
    pub italic: String,
    #[serde(default = "crate::defaults::style_bold_italic")]
    pub bold_italic: String,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            regular: crate::defaults::style_regular(),
            bold: crate::defaults::style_bold(),
            italic: crate::defaults::style_italic(),
            bold_italic: crate::defaults::style_bold_italic(),
        }
    }
}
