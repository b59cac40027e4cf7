//! The `Config` struct and its YAML persistence.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{FontMatcher, LogLevel, StyleTable};

/// Smallest accepted font size in pixels.
pub const MIN_FONT_SIZE: u32 = 1;
/// Largest accepted font size in pixels.
pub const MAX_FONT_SIZE: u32 = 512;

/// glyphrun configuration.
///
/// Every field has a default, so a partial (or empty) YAML file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    // ========================================================================
    // Fonts
    // ========================================================================
    /// Font pattern: a family with optional style words (`"Fira Code bold"`,
    /// `"Iosevka:weight=300"`) or a path to a font file
    #[serde(default = "crate::defaults::font_family")]
    pub font_family: String,

    /// Font size in pixels
    #[serde(default = "crate::defaults::font_size")]
    pub font_size: u32,

    /// Bold font pattern (optional, defaults to `font_family` in bold)
    #[serde(default)]
    pub font_family_bold: Option<String>,

    /// Italic font pattern (optional, defaults to `font_family` in italic)
    #[serde(default)]
    pub font_family_italic: Option<String>,

    /// Bold italic font pattern (optional, defaults to `font_family` in bold italic)
    #[serde(default)]
    pub font_family_bold_italic: Option<String>,

    /// Pattern for graphemes with emoji presentation
    #[serde(default = "crate::defaults::emoji_font_family")]
    pub emoji_font_family: String,

    /// Pattern used when `font_family` cannot be resolved at all
    #[serde(default = "crate::defaults::fallback_font_family")]
    pub fallback_font_family: String,

    /// OpenType feature settings applied while shaping (`"liga"`, `"-calt"`, `"ss01=1"`)
    #[serde(default = "crate::defaults::font_features")]
    pub font_features: Vec<String>,

    /// Font matching facility
    #[serde(default = "crate::defaults::font_matcher")]
    pub font_matcher: FontMatcher,

    /// Style-to-file table used when `font_matcher` is `style_table`
    #[serde(default)]
    pub style_table: StyleTable,

    // ========================================================================
    // Rendering
    // ========================================================================
    /// Maximum number of rasterized glyphs kept in the glyph cache
    #[serde(default = "crate::defaults::glyph_cache_capacity")]
    pub glyph_cache_capacity: usize,

    // ========================================================================
    // Debug Logging
    // ========================================================================
    /// Log verbosity (`off`, `error`, `warn`, `info`, `debug`, `trace`)
    #[serde(default = "crate::defaults::log_level")]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_family: crate::defaults::font_family(),
            font_size: crate::defaults::font_size(),
            font_family_bold: None,
            font_family_italic: None,
            font_family_bold_italic: None,
            emoji_font_family: crate::defaults::emoji_font_family(),
            fallback_font_family: crate::defaults::fallback_font_family(),
            font_features: crate::defaults::font_features(),
            font_matcher: crate::defaults::font_matcher(),
            style_table: StyleTable::default(),
            glyph_cache_capacity: crate::defaults::glyph_cache_capacity(),
            log_level: crate::defaults::log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, or defaults if there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            log::info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path)?;
        let config: Config = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(&contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Reject values no font session can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            return Err(ConfigError::Validation(format!(
                "font_size must be between {MIN_FONT_SIZE} and {MAX_FONT_SIZE}, got {}",
                self.font_size
            )));
        }
        if self.font_family.trim().is_empty() {
            return Err(ConfigError::Validation(
                "font_family must not be empty".to_string(),
            ));
        }
        if self.glyph_cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "glyph_cache_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("glyphrun")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // XDG convention on all platforms: ~/.config/glyphrun
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("glyphrun")
            } else {
                PathBuf::from(".")
            }
        }
    }
}
