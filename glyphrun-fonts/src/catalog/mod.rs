//! Font resolution with a de-duplicating, path-keyed font arena.
//!
//! The catalog is the sole owner of every [`FontHandle`]. Callers hold
//! [`FontId`]s (plain indices into the arena) inside [`FontList`]s, so a list
//! stays valid for as long as the catalog that produced it.
//!
//! # Resize aliasing
//!
//! The file path is the only cache key. Loading a path that is already cached
//! at a different size resizes the cached handle *in place*: every `FontList`
//! captured earlier that names the same file observes the new size. This keeps
//! the "resize the whole terminal" step trivial. Callers that need two sizes of
//! one file at the same time must use two catalogs.

mod fallbacks;
mod locator;
mod pattern;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::FontError;
use crate::font_handle::FontHandle;

pub use fallbacks::FALLBACK_FAMILIES;
pub use locator::{FontLocator, FontSource, StyleTableLocator, SystemFontLocator};
pub use pattern::{FontFamily, FontPattern, FontSlant};

/// Index of a font inside the [`FontCatalog`] that loaded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u32);

impl FontId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A resolved font request: the primary face plus its fallback chain.
///
/// Fallbacks keep the order the font matcher returned them in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontList {
    pub primary: FontId,
    pub fallbacks: Vec<FontId>,
}

impl FontList {
    pub fn new(primary: FontId) -> Self {
        Self {
            primary,
            fallbacks: Vec::new(),
        }
    }

    /// Primary first, then every fallback in order.
    pub fn iter(&self) -> impl Iterator<Item = FontId> + '_ {
        std::iter::once(self.primary).chain(self.fallbacks.iter().copied())
    }

    /// Number of fonts in the list, primary included.
    pub fn len(&self) -> usize {
        1 + self.fallbacks.len()
    }

    /// Always `false`: a list has at least its primary font.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Resolves font patterns and owns every loaded [`FontHandle`].
pub struct FontCatalog {
    locator: Box<dyn FontLocator>,
    fonts: Vec<FontHandle>,
    by_path: HashMap<PathBuf, FontId>,
}

impl FontCatalog {
    /// Catalog backed by the fonts installed on this system.
    pub fn new() -> Self {
        Self::with_locator(SystemFontLocator::new())
    }

    /// Catalog backed by a custom font matcher.
    pub fn with_locator(locator: impl FontLocator + 'static) -> Self {
        Self {
            locator: Box::new(locator),
            fonts: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    /// Turn a pattern into ranked candidates without loading anything.
    ///
    /// A pattern naming a font file resolves to exactly that file; anything
    /// else goes through the font matcher.
    pub fn resolve(&self, pattern: &str) -> Vec<FontSource> {
        if FontPattern::is_font_file(pattern) {
            let path = Path::new(pattern.trim());
            let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
            return vec![FontSource::new(path)];
        }
        self.locator.locate(&FontPattern::parse(pattern))
    }

    /// Resolve `pattern` and load the primary font and its fallbacks at `size` pixels.
    ///
    /// Fallback candidates that fail to load are skipped.
    ///
    /// # Errors
    /// [`FontError::NoFontFound`] if the matcher yields no candidates or the
    /// primary candidate cannot be opened.
    pub fn load(&mut self, pattern: &str, size: u32) -> Result<FontList, FontError> {
        let sources = self.resolve(pattern);
        let Some((primary_source, fallback_sources)) = sources.split_first() else {
            return Err(FontError::no_font_found(
                pattern,
                "font matcher returned no candidates",
            ));
        };

        let primary = self.load_source(primary_source, size).ok_or_else(|| {
            FontError::no_font_found(
                pattern,
                format!("failed to load primary font {:?}", primary_source.path),
            )
        })?;

        let mut fallbacks = Vec::with_capacity(fallback_sources.len());
        for source in fallback_sources {
            match self.load_source(source, size) {
                Some(id) if id != primary && !fallbacks.contains(&id) => fallbacks.push(id),
                Some(_) => {}
                None => log::debug!("Skipping unloadable fallback font {:?}", source.path),
            }
        }

        if let Some(font) = self.get(primary) {
            log::info!(
                "Loaded font \"{}\" from {:?}, baseline={}, height={}, size={}, fallbacks={}",
                pattern,
                font.path(),
                font.baseline(),
                font.bitmap_height(),
                size,
                fallbacks.len()
            );
        }

        Ok(FontList { primary, fallbacks })
    }

    /// Load one candidate, reusing (and resizing) a cached handle for the same path.
    pub fn load_source(&mut self, source: &FontSource, size: u32) -> Option<FontId> {
        if let Some(&id) = self.by_path.get(&source.path) {
            let font = &mut self.fonts[id.index()];
            if font.font_size() != size {
                log::debug!(
                    "Resizing cached font {:?} from {} to {}",
                    source.path,
                    font.font_size(),
                    size
                );
                font.set_size(size);
            }
            return Some(id);
        }

        let font = FontHandle::load(&source.path, source.face_index, size)?;
        let id = FontId(self.fonts.len() as u32);
        self.fonts.push(font);
        self.by_path.insert(source.path.clone(), id);
        Some(id)
    }

    /// Handle for `id`, or `None` if the id came from another catalog.
    pub fn get(&self, id: FontId) -> Option<&FontHandle> {
        self.fonts.get(id.index())
    }

    /// Cached font loaded from `path`, if any.
    pub fn find(&self, path: &Path) -> Option<FontId> {
        self.by_path.get(path).copied()
    }

    /// Number of distinct font files loaded so far.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Every loaded font, in load order.
    pub fn iter(&self) -> impl Iterator<Item = (FontId, &FontHandle)> {
        self.fonts
            .iter()
            .enumerate()
            .map(|(i, font)| (FontId(i as u32), font))
    }
}

impl Default for FontCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoMatch;

    impl FontLocator for NoMatch {
        fn locate(&self, _pattern: &FontPattern) -> Vec<FontSource> {
            Vec::new()
        }
    }

    #[test]
    fn test_font_file_pattern_bypasses_matcher() {
        let catalog = FontCatalog::with_locator(NoMatch);
        let sources = catalog.resolve("/opt/fonts/Hack-Regular.ttf");
        assert_eq!(sources, vec![FontSource::new("/opt/fonts/Hack-Regular.ttf")]);
    }

    #[test]
    fn test_no_candidates_is_no_font_found() {
        let mut catalog = FontCatalog::with_locator(NoMatch);
        let err = catalog.load("monospace", 16).unwrap_err();
        assert!(matches!(err, FontError::NoFontFound { ref pattern, .. } if pattern == "monospace"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_unreadable_primary_is_no_font_found() {
        let mut catalog = FontCatalog::with_locator(NoMatch);
        let err = catalog
            .load("/nonexistent/glyphrun/missing.ttf", 16)
            .unwrap_err();
        assert!(err.to_string().contains("failed to load primary font"));
    }

    #[test]
    fn test_font_list_iteration_order() {
        let list = FontList {
            primary: FontId(2),
            fallbacks: vec![FontId(0), FontId(5)],
        };
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![FontId(2), FontId(0), FontId(5)]);
        assert_eq!(list.len(), 3);
    }
}
