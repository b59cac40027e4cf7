//! Typed error types for glyphrun-fonts.
//!
//! Only font *resolution* can fail. Glyph-level gaps are absorbed by the
//! shaper's fallback search and never reach the caller as errors.

use thiserror::Error;

/// Errors raised while resolving a font pattern into a [`FontList`](crate::FontList).
#[derive(Debug, Error)]
pub enum FontError {
    /// The pattern produced no usable candidates, or the primary candidate
    /// could not be opened at the requested size.
    #[error("No usable font found for pattern '{pattern}': {detail}")]
    NoFontFound {
        /// The font pattern exactly as the caller supplied it.
        pattern: String,
        /// Which stage of resolution failed.
        detail: String,
    },
}

impl FontError {
    pub(crate) fn no_font_found(pattern: &str, detail: impl Into<String>) -> Self {
        FontError::NoFontFound {
            pattern: pattern.to_string(),
            detail: detail.into(),
        }
    }
}
