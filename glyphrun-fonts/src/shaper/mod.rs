//! Script-aware shaping with multi-font fallback.
//!
//! A shaping attempt walks a [`FontList`] in order:
//!
//! 1. the primary font; a result without missing glyphs is returned at once,
//! 2. each fallback font in turn, first fully resolved result wins,
//! 3. when every font lacked something, the primary font is shaped again and
//!    its missing glyphs are replaced with the primary font's U+FFFD glyph.
//!
//! The third step always produces a result, so shaping never fails for
//! missing glyphs. Given an unchanged catalog and the same input, the output
//! is always identical, which lets the shaper keep finished runs in an LRU
//! cache and skip the fallback search for repeated input.

mod engine;
mod script;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::num::NonZeroUsize;

use lru::LruCache;

pub use engine::{EngineGlyph, HarfBuzzEngine, HarfBuzzFont, ShapeRequest, ShapingEngine};
pub use script::{Script, is_emoji_presentation};

use crate::catalog::{FontCatalog, FontId, FontList};
use crate::font_handle::{FontHandle, REPLACEMENT_CHARACTER};
use crate::glyph::{GlyphPosition, GlyphPositionList};

/// One input codepoint and the source cluster it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codepoint {
    pub value: char,
    pub cluster: u32,
}

impl Codepoint {
    pub fn new(value: char, cluster: u32) -> Self {
        Self { value, cluster }
    }

    /// One codepoint per char of `text`, each its own cluster.
    pub fn run(text: &str) -> Vec<Codepoint> {
        text.chars()
            .enumerate()
            .map(|(i, value)| Codepoint::new(value, i as u32))
            .collect()
    }
}

/// Default number of shaped runs kept by a [`Shaper`].
pub const DEFAULT_RUN_CACHE_SIZE: usize = 1000;

/// Cache key for shaped runs
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct RunKey {
    script: Script,
    fonts: FontList,
    /// Pixel size of the primary font when the run was shaped
    size: u32,
    advance_x: i32,
    cluster_gap: u32,
    codepoints: Vec<Codepoint>,
}

/// Drives a [`ShapingEngine`] over a font fallback chain.
///
/// Per-font engine contexts are keyed by the font's identity hash, created on
/// first use and kept until [`Shaper::clear_cache`]. Contexts may share data
/// with the fonts they were built from, so clear the cache before dropping or
/// replacing those fonts.
///
/// Finished runs are cached too, keyed by the whole shaping input plus the
/// primary font's current size.
pub struct Shaper<E: ShapingEngine = HarfBuzzEngine> {
    engine: E,
    contexts: HashMap<u64, E::Context>,
    runs: LruCache<RunKey, GlyphPositionList>,
}

impl Shaper<HarfBuzzEngine> {
    /// Shaper backed by rustybuzz with no extra OpenType features.
    pub fn new() -> Self {
        Self::with_engine(HarfBuzzEngine::new())
    }
}

impl Default for Shaper<HarfBuzzEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ShapingEngine> Shaper<E> {
    pub fn with_engine(engine: E) -> Self {
        Self::with_cache_size(engine, DEFAULT_RUN_CACHE_SIZE)
    }

    /// Shaper keeping at most `max_runs` shaped runs (at least one).
    pub fn with_cache_size(engine: E, max_runs: usize) -> Self {
        let capacity = NonZeroUsize::new(max_runs).unwrap_or(NonZeroUsize::MIN);
        Self {
            engine,
            contexts: HashMap::new(),
            runs: LruCache::new(capacity),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Number of fonts that currently have a cached engine context.
    pub fn cached_fonts(&self) -> usize {
        self.contexts.len()
    }

    /// Number of shaped runs currently cached.
    pub fn cached_runs(&self) -> usize {
        self.runs.len()
    }

    /// Drop every cached engine context and shaped run.
    pub fn clear_cache(&mut self) {
        if !self.contexts.is_empty() || !self.runs.is_empty() {
            log::debug!(
                "Clearing {} cached shaping contexts and {} shaped runs",
                self.contexts.len(),
                self.runs.len()
            );
        }
        self.contexts.clear();
        self.runs.clear();
    }

    /// Shape `run` against `fonts`, falling back font by font.
    ///
    /// `cluster_gap` is added to every cluster index so several runs can be
    /// stitched into one line; x positions are `cluster * advance_x` plus the
    /// engine's offset.
    ///
    /// The result has one entry per glyph the engine produced. Glyph index `0`
    /// survives only when no font covers a codepoint and the primary font has
    /// no replacement glyph either. An unknown primary id yields an empty list.
    pub fn shape(
        &mut self,
        catalog: &FontCatalog,
        script: Script,
        fonts: &FontList,
        advance_x: i32,
        cluster_gap: u32,
        run: &[Codepoint],
    ) -> GlyphPositionList {
        let Some(primary) = catalog.get(fonts.primary) else {
            log::warn!("Font {:?} is not in this catalog; nothing shaped", fonts.primary);
            return GlyphPositionList::new();
        };

        let key = RunKey {
            script,
            fonts: fonts.clone(),
            size: primary.font_size(),
            advance_x,
            cluster_gap,
            codepoints: run.to_vec(),
        };
        if let Some(glyphs) = self.runs.get(&key) {
            return glyphs.clone();
        }

        let codepoints: Vec<Codepoint> = run
            .iter()
            .map(|cp| Codepoint::new(cp.value, cp.cluster.saturating_add(cluster_gap)))
            .collect();
        let request = ShapeRequest {
            script,
            codepoints: &codepoints,
        };
        let glyphs = self.search(catalog, primary, fonts, &request, advance_x);
        self.runs.put(key, glyphs.clone());
        glyphs
    }

    /// The uncached fallback search behind [`Shaper::shape`].
    fn search(
        &mut self,
        catalog: &FontCatalog,
        primary: &FontHandle,
        fonts: &FontList,
        request: &ShapeRequest<'_>,
        advance_x: i32,
    ) -> GlyphPositionList {
        if let Some(glyphs) = self.attempt(fonts.primary, primary, request, advance_x)
            && !glyphs.has_missing()
        {
            return glyphs;
        }

        for &id in &fonts.fallbacks {
            let Some(font) = catalog.get(id) else {
                log::debug!("Skipping fallback {:?}: not in this catalog", id);
                continue;
            };
            if let Some(glyphs) = self.attempt(id, font, request, advance_x)
                && !glyphs.has_missing()
            {
                return glyphs;
            }
        }

        if log::log_enabled!(log::Level::Debug) {
            let missing: Vec<String> = request
                .codepoints
                .iter()
                .filter(|cp| primary.glyph_index(cp.value) == 0)
                .map(|cp| format!("U+{:04X}", cp.value as u32))
                .collect();
            log::debug!(
                "No font in {:?} covers [{}]; substituting in primary font",
                primary.path(),
                missing.join(" ")
            );
        }

        let mut glyphs = self
            .attempt(fonts.primary, primary, request, advance_x)
            .unwrap_or_else(|| sentinel_run(fonts.primary, request.codepoints, advance_x));
        replace_missing_glyphs(primary, &mut glyphs);
        glyphs
    }

    /// One engine pass against one font, or `None` if the engine rejects the font.
    fn attempt(
        &mut self,
        id: FontId,
        font: &FontHandle,
        request: &ShapeRequest<'_>,
        advance_x: i32,
    ) -> Option<GlyphPositionList> {
        let context = match self.contexts.entry(font.hash_code()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => match self.engine.create_context(font) {
                Some(context) => entry.insert(context),
                None => {
                    log::debug!("Shaping engine cannot use font {:?}", font.path());
                    return None;
                }
            },
        };

        let glyphs = self
            .engine
            .shape(font, context, request)
            .into_iter()
            .map(|glyph| GlyphPosition {
                font: id,
                x: column_x(glyph.cluster, advance_x).saturating_add(glyph.x_offset >> 6),
                y: glyph.y_offset >> 6,
                glyph_index: glyph.glyph_index,
                cluster: glyph.cluster,
            })
            .collect();
        Some(GlyphPositionList(glyphs))
    }
}

/// Pen position of cluster column `cluster`, saturating at `i32::MAX`.
fn column_x(cluster: u32, advance_x: i32) -> i32 {
    i32::try_from(cluster)
        .unwrap_or(i32::MAX)
        .saturating_mul(advance_x)
}

/// One missing-glyph entry per codepoint, for fonts the engine cannot shape at all.
fn sentinel_run(font: FontId, codepoints: &[Codepoint], advance_x: i32) -> GlyphPositionList {
    GlyphPositionList(
        codepoints
            .iter()
            .map(|cp| GlyphPosition {
                font,
                x: column_x(cp.cluster, advance_x),
                y: 0,
                glyph_index: 0,
                cluster: cp.cluster,
            })
            .collect(),
    )
}

/// Overwrite every missing glyph with `primary`'s replacement character glyph.
///
/// Leaves the list untouched when `primary` has no U+FFFD glyph.
pub fn replace_missing_glyphs(primary: &FontHandle, glyphs: &mut GlyphPositionList) {
    let replacement = primary.glyph_index(REPLACEMENT_CHARACTER);
    if replacement == 0 {
        return;
    }
    for glyph in glyphs.iter_mut().filter(|glyph| glyph.is_missing()) {
        glyph.glyph_index = replacement;
    }
}
