//! Renderer-side caches for glyphrun.
//!
//! This crate sits between the shaper's [`GlyphPositionList`] output and a GPU
//! backend:
//! - [`GlyphCache`]: rasterized glyphs keyed by font identity, glyph index and size
//! - [`ImageDiscardQueue`]: inline images released from any thread, dropped by
//!   the render thread at the start of each frame
//! - [`RenderCache`]: ties both together for one renderer instance

mod glyph_cache;
mod image_discard;

use std::collections::HashMap;
use std::sync::Arc;

use glyphrun_fonts::{FontCatalog, GlyphBitmap, GlyphPositionList, ScaleContext};

pub use glyph_cache::{GlyphCache, GlyphKey};
pub use image_discard::{ImageDiscardQueue, ImageId};

/// A rasterized glyph placed relative to the start of its line.
#[derive(Debug, Clone)]
pub struct PlacedGlyph {
    /// Pen position: the shaped x plus the bitmap's left bearing
    pub x: i32,
    /// Shaped y offset minus the bitmap's top bearing
    pub y: i32,
    pub bitmap: Arc<GlyphBitmap>,
}

/// Per-renderer glyph and image caches.
pub struct RenderCache {
    glyphs: GlyphCache,
    images: HashMap<ImageId, Arc<Vec<u8>>>,
    discard: ImageDiscardQueue,
    scale_context: ScaleContext,
    frame: u64,
}

impl RenderCache {
    pub fn new(glyph_capacity: usize) -> Self {
        Self {
            glyphs: GlyphCache::new(glyph_capacity),
            images: HashMap::new(),
            discard: ImageDiscardQueue::new(),
            scale_context: ScaleContext::new(),
            frame: 0,
        }
    }

    /// Handle other threads use to schedule image releases.
    pub fn discard_queue(&self) -> ImageDiscardQueue {
        self.discard.clone()
    }

    /// Start a frame: release every image queued since the previous frame.
    ///
    /// Returns how many images were released.
    pub fn begin_frame(&mut self) -> usize {
        self.frame += 1;
        let mut released = 0;
        for id in self.discard.drain() {
            if self.images.remove(&id).is_some() {
                released += 1;
            } else {
                log::debug!("Discard requested for unknown image {}", id);
            }
        }
        if released > 0 {
            log::debug!("Frame {}: released {} images", self.frame, released);
        }
        released
    }

    /// Number of frames started so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Store pixel data for an inline image, replacing any earlier upload.
    pub fn upload_image(&mut self, id: ImageId, pixels: Vec<u8>) {
        self.images.insert(id, Arc::new(pixels));
    }

    pub fn image(&self, id: ImageId) -> Option<Arc<Vec<u8>>> {
        self.images.get(&id).cloned()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn glyphs(&self) -> &GlyphCache {
        &self.glyphs
    }

    /// Drop every cached glyph, e.g. after the font set was replaced.
    pub fn clear_glyphs(&mut self) {
        self.glyphs.clear();
    }

    /// Rasterize (or fetch from cache) every glyph of a shaped run.
    ///
    /// Missing-glyph sentinels render nothing and are skipped, as are glyphs
    /// whose font is not in `catalog` and glyphs without an image.
    pub fn rasterize_run(
        &mut self,
        catalog: &FontCatalog,
        positions: &GlyphPositionList,
    ) -> Vec<PlacedGlyph> {
        let mut placed = Vec::with_capacity(positions.len());
        for position in positions {
            if position.is_missing() {
                continue;
            }
            let Some(font) = catalog.get(position.font) else {
                log::warn!("Glyph references unknown font {:?}", position.font);
                continue;
            };

            let key = GlyphKey {
                font: font.hash_code(),
                glyph_index: position.glyph_index,
                size: font.font_size(),
            };
            let scale_context = &mut self.scale_context;
            let bitmap = self.glyphs.get_or_insert_with(key, || {
                font.rasterize(scale_context, position.glyph_index)
            });

            if let Some(bitmap) = bitmap {
                placed.push(PlacedGlyph {
                    x: position.x + bitmap.left,
                    y: position.y - bitmap.top,
                    bitmap,
                });
            }
        }
        placed
    }
}
