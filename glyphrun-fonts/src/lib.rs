//! Font resolution and text shaping for glyphrun.
//!
//! This crate provides:
//! - Font pattern resolution through the platform font matcher (fontdb) or a
//!   fixed style table, with a path-keyed, de-duplicating font catalog
//! - Loaded font faces with size-dependent metrics and glyph rasterization (swash)
//! - HarfBuzz shaping via rustybuzz with an ordered multi-font fallback search
//!   and replacement-character substitution
//!
//! # Architecture
//!
//! ```text
//! pattern ──FontCatalog::load──▶ FontList ──Shaper::shape──▶ GlyphPositionList
//! ```
//!
//! The [`FontCatalog`] owns every [`FontHandle`]; a [`FontList`] only holds
//! [`FontId`]s into it. The [`Shaper`] keeps one engine context per font
//! until [`Shaper::clear_cache`] is called.

pub mod catalog;
mod error;
mod fnv;
pub mod font_handle;
pub mod glyph;
pub mod shaper;

#[cfg(feature = "test-fonts")]
pub mod testing;

pub use catalog::{
    FALLBACK_FAMILIES, FontCatalog, FontFamily, FontId, FontList, FontLocator, FontPattern,
    FontSlant, FontSource, StyleTableLocator, SystemFontLocator,
};
pub use error::FontError;
pub use fnv::fnv1a_64;
pub use font_handle::{FontHandle, GlyphBitmap, REPLACEMENT_CHARACTER};
pub use glyph::{GlyphPosition, GlyphPositionList};
pub use shaper::{
    Codepoint, DEFAULT_RUN_CACHE_SIZE, EngineGlyph, HarfBuzzEngine, HarfBuzzFont, Script,
    ShapeRequest, Shaper, ShapingEngine, is_emoji_presentation, replace_missing_glyphs,
};
pub use swash::scale::ScaleContext;
