//! Default values for configuration fields, used by `#[serde(default = ...)]`.

use crate::types::{FontMatcher, LogLevel};

pub fn font_family() -> String {
    "monospace".to_string()
}

pub fn font_size() -> u32 {
    16
}

pub fn emoji_font_family() -> String {
    "Noto Color Emoji".to_string()
}

pub fn fallback_font_family() -> String {
    "monospace".to_string()
}

pub fn font_features() -> Vec<String> {
    Vec::new()
}

pub fn font_matcher() -> FontMatcher {
    FontMatcher::System
}

pub fn glyph_cache_capacity() -> usize {
    4096 // Rasterized glyphs kept before LRU eviction
}

pub fn log_level() -> LogLevel {
    LogLevel::Warn
}

pub fn style_regular() -> String {
    "C:\\Windows\\Fonts\\consola.ttf".to_string()
}

pub fn style_bold() -> String {
    "C:\\Windows\\Fonts\\consolab.ttf".to_string()
}

pub fn style_italic() -> String {
    "C:\\Windows\\Fonts\\consolai.ttf".to_string()
}

pub fn style_bold_italic() -> String {
    "C:\\Windows\\Fonts\\consolaz.ttf".to_string()
}
