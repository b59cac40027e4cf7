//! The shaping engine seam and its HarfBuzz (rustybuzz) implementation.

use std::str::FromStr;
use std::sync::Arc;

use rustybuzz::{Direction, Face, Feature, UnicodeBuffer};

use super::Codepoint;
use super::script::Script;
use crate::font_handle::FontHandle;

/// One glyph as reported by a shaping engine.
///
/// Offsets are in 26.6 fixed point (1/64 pixel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineGlyph {
    pub glyph_index: u32,
    pub cluster: u32,
    pub x_offset: i32,
    pub y_offset: i32,
}

/// Input for one shaping attempt against one font.
#[derive(Debug, Clone, Copy)]
pub struct ShapeRequest<'a> {
    pub script: Script,
    /// Codepoints with their final (gap-adjusted) cluster indices
    pub codepoints: &'a [Codepoint],
}

/// A text shaping engine that needs persistent per-font state.
///
/// The [`Shaper`](super::Shaper) creates one context per font on first use
/// and passes it back on every later call for that font.
pub trait ShapingEngine {
    type Context;

    /// Build the per-font state, or `None` if the engine cannot use the font.
    fn create_context(&mut self, font: &FontHandle) -> Option<Self::Context>;

    /// Shape one run. Missing glyphs are reported with glyph index `0`.
    fn shape(
        &mut self,
        font: &FontHandle,
        context: &Self::Context,
        request: &ShapeRequest<'_>,
    ) -> Vec<EngineGlyph>;
}

/// Parsed rustybuzz face kept alive across shaping calls.
pub struct HarfBuzzFont {
    // Declared before `_data` so the face is dropped before the bytes it borrows.
    face: Face<'static>,
    _data: Arc<Vec<u8>>,
    units_per_em: i32,
}

/// Shapes with rustybuzz, a pure Rust HarfBuzz port.
pub struct HarfBuzzEngine {
    features: Vec<Feature>,
    /// Input buffer recycled between calls
    buffer: Option<UnicodeBuffer>,
}

impl HarfBuzzEngine {
    pub fn new() -> Self {
        Self {
            features: Vec::new(),
            buffer: Some(UnicodeBuffer::new()),
        }
    }

    /// Engine applying the given OpenType feature settings to every run.
    ///
    /// Accepts HarfBuzz feature syntax: `"liga"`, `"-calt"`, `"ss01=1"`.
    /// Unparseable entries are skipped with a warning.
    pub fn with_features<S: AsRef<str>>(features: &[S]) -> Self {
        let features = features
            .iter()
            .filter_map(|s| {
                let s = s.as_ref().trim();
                match Feature::from_str(s) {
                    Ok(feature) => Some(feature),
                    Err(_) => {
                        log::warn!("Ignoring invalid font feature '{}'", s);
                        None
                    }
                }
            })
            .collect();
        Self {
            features,
            buffer: Some(UnicodeBuffer::new()),
        }
    }

    /// Number of OpenType features applied per run.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }
}

impl Default for HarfBuzzEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapingEngine for HarfBuzzEngine {
    type Context = HarfBuzzFont;

    fn create_context(&mut self, font: &FontHandle) -> Option<HarfBuzzFont> {
        let data = font.shared_data();

        // SAFETY: the bytes live in an Arc that is stored next to the face in
        // `HarfBuzzFont`. The face is dropped first (field order) and the Vec
        // is never mutated, so the slice stays valid for the face's lifetime.
        let face = unsafe {
            let bytes: &'static [u8] = std::mem::transmute(data.as_slice());
            Face::from_slice(bytes, font.face_index())?
        };

        let units_per_em = i32::from(font.font_ref().metrics(&[]).units_per_em.max(1));
        Some(HarfBuzzFont {
            face,
            _data: data,
            units_per_em,
        })
    }

    fn shape(
        &mut self,
        font: &FontHandle,
        context: &HarfBuzzFont,
        request: &ShapeRequest<'_>,
    ) -> Vec<EngineGlyph> {
        let mut buffer = self.buffer.take().unwrap_or_else(UnicodeBuffer::new);
        for codepoint in request.codepoints {
            buffer.add(codepoint.value, codepoint.cluster);
        }
        buffer.set_direction(Direction::LeftToRight);
        if let Some(tag) = request.script.engine_tag()
            && let Ok(script) = rustybuzz::Script::from_str(tag)
        {
            buffer.set_script(script);
        }
        buffer.guess_segment_properties();

        let output = rustybuzz::shape(&context.face, &self.features, buffer);

        // Font units to 26.6 pixels at the handle's current size.
        let size = font.font_size() as i64;
        let upem = i64::from(context.units_per_em);
        let to_fixed = |units: i32| (i64::from(units) * size * 64 / upem) as i32;

        let glyphs = output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| EngineGlyph {
                glyph_index: info.glyph_id,
                cluster: info.cluster,
                x_offset: to_fixed(pos.x_offset),
                y_offset: to_fixed(pos.y_offset),
            })
            .collect();

        self.buffer = Some(output.clear());
        glyphs
    }
}
