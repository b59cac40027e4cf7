//! Positioned glyph output handed to the rendering layer.

use std::fmt;

use crate::catalog::FontId;

/// One shaped glyph, positioned relative to the start of the shaped line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphPosition {
    /// Catalog entry of the font the glyph index belongs to
    pub font: FontId,
    /// Horizontal pixel position (cluster column times advance, plus engine offset)
    pub x: i32,
    /// Vertical pixel offset from the baseline
    pub y: i32,
    /// Glyph index within `font`; `0` means the font has no glyph here
    pub glyph_index: u32,
    /// Source cluster this glyph was produced from
    pub cluster: u32,
}

impl GlyphPosition {
    /// Whether this entry is the "no glyph available" sentinel.
    pub fn is_missing(&self) -> bool {
        self.glyph_index == 0
    }
}

impl fmt::Display for GlyphPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{x:{} y:{} i:{} c:{}}}",
            self.x, self.y, self.glyph_index, self.cluster
        )
    }
}

/// Ordered glyph positions for one shaped run or line.
///
/// The length follows the shaping engine's output, which may differ from the
/// number of input codepoints once ligatures and decompositions are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphPositionList(pub Vec<GlyphPosition>);

impl GlyphPositionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Whether any entry is still a missing-glyph sentinel.
    pub fn has_missing(&self) -> bool {
        self.0.iter().any(GlyphPosition::is_missing)
    }

    /// Append every glyph of `other`, keeping order.
    pub fn extend_from(&mut self, other: GlyphPositionList) {
        self.0.extend(other.0);
    }
}

impl std::ops::Deref for GlyphPositionList {
    type Target = Vec<GlyphPosition>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for GlyphPositionList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for GlyphPositionList {
    type Item = GlyphPosition;
    type IntoIter = std::vec::IntoIter<GlyphPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a GlyphPositionList {
    type Item = &'a GlyphPosition;
    type IntoIter = std::slice::Iter<'a, GlyphPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for GlyphPositionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, glyph) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{glyph}")?;
        }
        Ok(())
    }
}
