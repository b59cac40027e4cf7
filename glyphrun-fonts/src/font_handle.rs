//! A single loaded font face at one pixel size.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustybuzz::ttf_parser;
use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::{CacheKey, FontRef};

use crate::fnv::fnv1a_64;

/// Codepoint whose glyph stands in for characters that no font can render.
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// Advance used when a face reports no usable glyph advances at all.
const DEFAULT_MAX_ADVANCE: u32 = 8;

/// Tables whose presence marks a face as carrying color glyphs.
const COLOR_TABLES: [&[u8; 4]; 4] = [b"COLR", b"CBDT", b"sbix", b"SVG "];

/// A rasterized glyph image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Horizontal offset from the pen position to the left edge
    pub left: i32,
    /// Vertical offset from the baseline to the top edge
    pub top: i32,
    /// `true` for RGBA color images, `false` for 1-byte alpha masks
    pub is_color: bool,
    /// Pixel data, row-major, top row first
    pub pixels: Vec<u8>,
}

/// Size-dependent metrics, re-derived whenever the pixel size changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SizedMetrics {
    bitmap_width: u32,
    bitmap_height: u32,
    max_advance: u32,
    line_height: u32,
    baseline: u32,
}

/// One font face, loaded from one file, at one (mutable) pixel size.
///
/// A handle exclusively owns its font bytes and is deliberately not `Clone`:
/// the catalog hands out [`FontId`](crate::FontId)s instead of copies, so a
/// resize through the catalog is observed by every holder of the id.
///
/// The identity hash is the FNV-1a hash of the file path and never changes
/// for the lifetime of the handle, whatever size it is later set to.
pub struct FontHandle {
    path: PathBuf,
    data: Arc<Vec<u8>>,
    face_index: u32,
    offset: u32,
    key: CacheKey,
    hash: u64,
    size: u32,
    metrics: SizedMetrics,
    has_color: bool,
    fixed_width: bool,
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontHandle")
            .field("path", &self.path)
            .field("face_index", &self.face_index)
            .field("size", &self.size)
            .field("hash", &format_args!("{:016x}", self.hash))
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl FontHandle {
    /// Open the face at `face_index` inside the font file at `path`.
    ///
    /// # Returns
    /// `None` if the file cannot be read or does not contain a usable face.
    /// The catalog treats this as "skip this candidate", not as an error.
    pub fn load(path: &Path, face_index: u32, size: u32) -> Option<Self> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                log::debug!("Failed to read font file {:?}: {}", path, e);
                return None;
            }
        };
        let handle = Self::from_bytes(path, data, face_index, size);
        if handle.is_none() {
            log::debug!("Font file {:?} has no usable face {}", path, face_index);
        }
        handle
    }

    /// Build a handle from font bytes already in memory.
    ///
    /// `path` is still the identity of the handle; it is not read.
    /// Sizes below one pixel are clamped to one.
    pub fn from_bytes(path: &Path, data: Vec<u8>, face_index: u32, size: u32) -> Option<Self> {
        let data = Arc::new(data);
        let font_ref = FontRef::from_index(data.as_slice(), face_index as usize)?;

        let has_color = COLOR_TABLES
            .into_iter()
            .any(|tag| font_ref.table(swash::tag_from_bytes(tag)).is_some());
        let fixed_width = font_ref.metrics(&[]).is_monospace;
        let (offset, key) = (font_ref.offset, font_ref.key);

        let size = size.max(1);
        let metrics = measure(font_ref, data.as_slice(), face_index, size);

        Some(FontHandle {
            hash: fnv1a_64(path.to_string_lossy().as_bytes()),
            path: path.to_path_buf(),
            data,
            face_index,
            offset,
            key,
            size,
            metrics,
            has_color,
            fixed_width,
        })
    }

    /// Swash view of the face, borrowed from the owned bytes.
    pub fn font_ref(&self) -> FontRef<'_> {
        FontRef {
            data: self.data.as_slice(),
            offset: self.offset,
            key: self.key,
        }
    }

    /// Absolute path of the font file this face was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Face index within the font file (non-zero only for collections).
    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    /// Stable identity hash (FNV-1a of the file path).
    pub fn hash_code(&self) -> u64 {
        self.hash
    }

    /// Raw font bytes.
    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Shared handle to the raw font bytes, for engines that keep their own
    /// parsed view of the face alive across calls.
    pub fn shared_data(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.data)
    }

    /// Current pixel size.
    pub fn font_size(&self) -> u32 {
        self.size
    }

    /// Change the pixel size and re-derive all size-dependent metrics.
    ///
    /// Calling this with the current size is a no-op.
    pub fn set_size(&mut self, size: u32) {
        let size = size.max(1);
        if size == self.size {
            return;
        }
        self.metrics = measure(self.font_ref(), self.data.as_slice(), self.face_index, size);
        self.size = size;
    }

    /// Width of the face's global bounding box at the current size.
    pub fn bitmap_width(&self) -> u32 {
        self.metrics.bitmap_width
    }

    /// Height of the face's global bounding box at the current size.
    pub fn bitmap_height(&self) -> u32 {
        self.metrics.bitmap_height
    }

    /// Horizontal advance of a representative glyph, used as cell width.
    pub fn max_advance(&self) -> u32 {
        self.metrics.max_advance
    }

    /// Distance between consecutive baselines.
    pub fn line_height(&self) -> u32 {
        self.metrics.line_height
    }

    /// Distance from the bottom of the line box up to the baseline.
    pub fn baseline(&self) -> u32 {
        self.metrics.baseline
    }

    /// Whether the face carries color glyphs (emoji).
    pub fn has_color(&self) -> bool {
        self.has_color
    }

    /// Whether the face declares itself fixed-pitch.
    pub fn is_fixed_width(&self) -> bool {
        self.fixed_width
    }

    /// Glyph index for `ch` in this face, or `0` if the face lacks it.
    pub fn glyph_index(&self, ch: char) -> u32 {
        u32::from(self.font_ref().charmap().map(ch))
    }

    /// Rasterize a glyph at the current pixel size.
    ///
    /// Color bitmaps and color outlines are preferred so emoji faces render
    /// in color; everything else renders as an alpha mask.
    pub fn rasterize(&self, context: &mut ScaleContext, glyph_index: u32) -> Option<GlyphBitmap> {
        let glyph_id = u16::try_from(glyph_index).ok()?;
        let mut scaler = context
            .builder(self.font_ref())
            .size(self.size as f32)
            .hint(true)
            .build();

        let image = Render::new(&[
            Source::ColorBitmap(StrikeWith::BestFit),
            Source::ColorOutline(0),
            Source::Outline,
        ])
        .render(&mut scaler, glyph_id)?;

        Some(GlyphBitmap {
            width: image.placement.width,
            height: image.placement.height,
            left: image.placement.left,
            top: image.placement.top,
            is_color: matches!(image.content, Content::Color),
            pixels: image.data,
        })
    }
}

/// Derive every size-dependent metric for `size` pixels per em.
fn measure(font: FontRef<'_>, data: &[u8], face_index: u32, size: u32) -> SizedMetrics {
    let metrics = font.metrics(&[]);
    let upem = f32::from(metrics.units_per_em.max(1));
    let to_px = |units: f32| units * size as f32 / upem;

    let descent = metrics.descent.abs();
    let line_height = to_px(metrics.ascent.abs() + descent + metrics.leading).ceil() as u32;
    let baseline = to_px(descent) as u32;
    let max_advance = max_advance(font, metrics.glyph_count, to_px);

    let (bitmap_width, bitmap_height) = match ttf_parser::Face::parse(data, face_index) {
        Ok(face) => {
            let bbox = face.global_bounding_box();
            let width = i32::from(bbox.x_max) - i32::from(bbox.x_min);
            let height = i32::from(bbox.y_max) - i32::from(bbox.y_min);
            (
                to_px(width.max(0) as f32) as u32,
                to_px(height.max(0) as f32) as u32,
            )
        }
        Err(_) => (max_advance, line_height),
    };

    SizedMetrics {
        bitmap_width,
        bitmap_height,
        max_advance,
        line_height,
        baseline,
    }
}

/// Advance of `M`, else the mean advance over all glyphs, else a fixed guess.
fn max_advance(font: FontRef<'_>, glyph_count: u16, to_px: impl Fn(f32) -> f32) -> u32 {
    let glyph_metrics = font.glyph_metrics(&[]);

    let em_glyph = font.charmap().map('M');
    if em_glyph != 0 {
        let advance = to_px(glyph_metrics.advance_width(em_glyph)) as u32;
        if advance > 0 {
            return advance;
        }
    }

    if glyph_count > 0 {
        let total: f32 = (0..glyph_count)
            .map(|glyph| glyph_metrics.advance_width(glyph))
            .sum();
        let mean = to_px(total / f32::from(glyph_count)) as u32;
        if mean > 0 {
            return mean;
        }
    }

    DEFAULT_MAX_ADVANCE
}
