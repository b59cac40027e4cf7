//! Shared integration test helpers for glyphrun-fonts.
//!
//! Tests never rely on fonts installed on the host: fonts come from the
//! synthetic builder in the crate's `src/testing.rs`, and [`MockEngine`] records which
//! fonts the shaper tried.

#![allow(dead_code)]

// Integration tests cannot switch on this crate's own `test-fonts` feature,
// so the builder source is compiled in directly.
#[path = "../../src/testing.rs"]
mod font_builder;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glyphrun_fonts::{
    EngineGlyph, FontHandle, FontLocator, FontPattern, FontSource, ShapeRequest, ShapingEngine,
};

pub use font_builder::*;

/// Locator that answers every pattern with the same ranked candidates.
pub struct FixedLocator(pub Vec<FontSource>);

impl FixedLocator {
    pub fn paths<P: AsRef<Path>>(paths: &[P]) -> Self {
        Self(paths.iter().map(|p| FontSource::new(p.as_ref())).collect())
    }
}

impl FontLocator for FixedLocator {
    fn locate(&self, _pattern: &FontPattern) -> Vec<FontSource> {
        self.0.clone()
    }
}

/// Shaping engine that maps codepoints straight through the font's cmap
/// and records every call.
#[derive(Default)]
pub struct MockEngine {
    /// Font paths in the order shaping was attempted
    pub calls: Vec<PathBuf>,
    /// Number of per-font contexts created
    pub contexts_created: usize,
    /// Fonts the engine refuses to build a context for
    pub rejected: HashSet<PathBuf>,
    /// x offset reported for every glyph, in 1/64 px
    pub x_offset: i32,
}

impl ShapingEngine for MockEngine {
    type Context = PathBuf;

    fn create_context(&mut self, font: &FontHandle) -> Option<PathBuf> {
        if self.rejected.contains(font.path()) {
            return None;
        }
        self.contexts_created += 1;
        Some(font.path().to_path_buf())
    }

    fn shape(
        &mut self,
        font: &FontHandle,
        context: &PathBuf,
        request: &ShapeRequest<'_>,
    ) -> Vec<EngineGlyph> {
        assert_eq!(context, font.path(), "context used with the wrong font");
        self.calls.push(context.clone());
        request
            .codepoints
            .iter()
            .map(|cp| EngineGlyph {
                glyph_index: font.glyph_index(cp.value),
                cluster: cp.cluster,
                x_offset: self.x_offset,
                y_offset: 0,
            })
            .collect()
    }
}
