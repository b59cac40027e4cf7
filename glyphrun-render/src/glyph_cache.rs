//! LRU cache of rasterized glyphs.

use std::num::NonZeroUsize;
use std::sync::Arc;

use glyphrun_fonts::GlyphBitmap;
use lru::LruCache;

/// Identity of one rasterized glyph image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    /// Identity hash of the font ([`FontHandle::hash_code`](glyphrun_fonts::FontHandle::hash_code))
    pub font: u64,
    pub glyph_index: u32,
    /// Pixel size the glyph was rasterized at
    pub size: u32,
}

/// Rasterized glyphs, least recently used evicted first.
///
/// Glyphs that produce no image (spaces, empty outlines) are cached as
/// `None` so they are not re-rasterized every frame.
pub struct GlyphCache {
    entries: LruCache<GlyphKey, Option<Arc<GlyphBitmap>>>,
    hits: u64,
    misses: u64,
}

impl GlyphCache {
    /// Cache holding at most `capacity` glyphs (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached image for `key`, rasterizing it with `rasterize` on a miss.
    pub fn get_or_insert_with(
        &mut self,
        key: GlyphKey,
        rasterize: impl FnOnce() -> Option<GlyphBitmap>,
    ) -> Option<Arc<GlyphBitmap>> {
        if let Some(entry) = self.entries.get(&key) {
            self.hits += 1;
            return entry.clone();
        }
        self.misses += 1;
        let entry = rasterize().map(Arc::new);
        self.entries.put(key, entry.clone());
        entry
    }

    /// Whether `key` is cached, without touching its recency.
    pub fn contains(&self, key: &GlyphKey) -> bool {
        self.entries.contains(key)
    }

    /// Drop every glyph rasterized from the font with identity `font`.
    pub fn remove_font(&mut self, font: u64) -> usize {
        let stale: Vec<GlyphKey> = self
            .entries
            .iter()
            .map(|(key, _)| *key)
            .filter(|key| key.font == font)
            .collect();
        for key in &stale {
            self.entries.pop(key);
        }
        stale.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
