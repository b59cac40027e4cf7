//! Font matching: turning a parsed pattern into ranked font file candidates.

use std::path::{Path, PathBuf};

use fontdb::{Database, Family, Query};

use super::fallbacks::FALLBACK_FAMILIES;
use super::pattern::{FontFamily, FontPattern, FontSlant};

/// One candidate face: a font file and the face index inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSource {
    pub path: PathBuf,
    /// Face index within the file (0 unless the file is a collection)
    pub face_index: u32,
}

impl FontSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            face_index: 0,
        }
    }

    pub fn with_face_index(mut self, face_index: u32) -> Self {
        self.face_index = face_index;
        self
    }
}

/// Platform font matching.
///
/// Implementations return candidates best-match first; every following entry
/// is a fallback face meant to cover codepoints the first one lacks. An empty
/// list means nothing matched.
pub trait FontLocator {
    fn locate(&self, pattern: &FontPattern) -> Vec<FontSource>;
}

/// Append `source` unless a candidate with the same file is already present.
fn push_unique(candidates: &mut Vec<FontSource>, source: FontSource) {
    if !candidates.iter().any(|c| c.path == source.path) {
        candidates.push(source);
    }
}

/// Matches against the fonts installed on this system, via `fontdb`.
///
/// A named family that is not installed is substituted with the closest
/// monospaced face, so any non-empty database yields a primary candidate.
pub struct SystemFontLocator {
    db: Database,
    fallback_families: Vec<String>,
}

impl SystemFontLocator {
    /// Scan the system font directories.
    pub fn new() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::info!("Loaded {} system fonts", db.len());
        Self::with_database(db)
    }

    /// Match against an already populated database.
    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            fallback_families: FALLBACK_FAMILIES.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replace the fallback families appended after the best match.
    pub fn with_fallback_families(mut self, families: Vec<String>) -> Self {
        self.fallback_families = families;
        self
    }

    /// Number of faces known to the database.
    pub fn font_count(&self) -> usize {
        self.db.len()
    }

    fn query(&self, family: Family<'_>, weight: fontdb::Weight, style: fontdb::Style) -> Option<FontSource> {
        let query = Query {
            families: &[family],
            weight,
            style,
            ..Query::default()
        };
        let id = self.db.query(&query)?;
        let face = self.db.face(id)?;
        Some(FontSource::new(source_path(&face.source)?).with_face_index(face.index))
    }

    /// First installed monospaced face, closest to the requested weight.
    ///
    /// Used when the generic `monospace` family has no mapping in the database.
    fn monospace_face(&self, weight: fontdb::Weight, style: fontdb::Style) -> Option<FontSource> {
        self.closest_face(weight, style, |face| face.monospaced)
    }

    /// Installed face passing `keep`, preferring the requested style and then
    /// the nearest weight.
    fn closest_face(
        &self,
        weight: fontdb::Weight,
        style: fontdb::Style,
        keep: impl Fn(&fontdb::FaceInfo) -> bool,
    ) -> Option<FontSource> {
        let distance = |face: &fontdb::FaceInfo| (i32::from(face.weight.0) - i32::from(weight.0)).abs();
        let face = self
            .db
            .faces()
            .filter(|face| keep(*face) && face.style == style)
            .min_by_key(|face| distance(*face))
            .or_else(|| {
                self.db
                    .faces()
                    .filter(|face| keep(*face))
                    .min_by_key(|face| distance(*face))
            })?;
        Some(FontSource::new(source_path(&face.source)?).with_face_index(face.index))
    }

    /// Stand-in for a named family that is not installed: the monospace
    /// family, then any monospaced face, then any face at all.
    fn substitute(&self, weight: fontdb::Weight, style: fontdb::Style) -> Option<FontSource> {
        self.query(Family::Monospace, weight, style)
            .or_else(|| self.monospace_face(weight, style))
            .or_else(|| self.closest_face(weight, style, |_| true))
    }
}

impl Default for SystemFontLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl FontLocator for SystemFontLocator {
    fn locate(&self, pattern: &FontPattern) -> Vec<FontSource> {
        let weight = fontdb::Weight(pattern.weight);
        let style = match pattern.slant {
            FontSlant::Upright => fontdb::Style::Normal,
            FontSlant::Italic => fontdb::Style::Italic,
            FontSlant::Oblique => fontdb::Style::Oblique,
        };

        let primary = match &pattern.family {
            FontFamily::Named(name) => self.query(Family::Name(name), weight, style).or_else(|| {
                log::debug!("Font family '{}' not installed; substituting", name);
                self.substitute(weight, style)
            }),
            FontFamily::Monospace => self
                .query(Family::Monospace, weight, style)
                .or_else(|| self.monospace_face(weight, style)),
            FontFamily::SansSerif => self.query(Family::SansSerif, weight, style),
            FontFamily::Serif => self.query(Family::Serif, weight, style),
            FontFamily::Cursive => self.query(Family::Cursive, weight, style),
            FontFamily::Fantasy => self.query(Family::Fantasy, weight, style),
        };

        let mut candidates = Vec::new();
        match primary {
            Some(source) => candidates.push(source),
            None => {
                log::debug!("No installed face matches {:?}", pattern);
                return candidates;
            }
        }

        for family in &self.fallback_families {
            if let Some(source) = self.query(Family::Name(family), weight, style) {
                push_unique(&mut candidates, source);
            }
        }
        candidates
    }
}

fn source_path(source: &fontdb::Source) -> Option<PathBuf> {
    match source {
        fontdb::Source::File(path) => Some(path.clone()),
        fontdb::Source::SharedFile(path, _) => Some(path.clone()),
        fontdb::Source::Binary(_) => None,
    }
}

/// Fixed style→file table for platforms without a font matching facility.
///
/// Only the style of the pattern matters; the family is ignored and no
/// fallback faces are offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTableLocator {
    regular: PathBuf,
    bold: PathBuf,
    italic: PathBuf,
    bold_italic: PathBuf,
}

impl StyleTableLocator {
    pub fn new(
        regular: impl Into<PathBuf>,
        bold: impl Into<PathBuf>,
        italic: impl Into<PathBuf>,
        bold_italic: impl Into<PathBuf>,
    ) -> Self {
        Self {
            regular: regular.into(),
            bold: bold.into(),
            italic: italic.into(),
            bold_italic: bold_italic.into(),
        }
    }

    /// The Consolas family shipped with Windows.
    pub fn consolas() -> Self {
        Self::new(
            "C:\\Windows\\Fonts\\consola.ttf",
            "C:\\Windows\\Fonts\\consolab.ttf",
            "C:\\Windows\\Fonts\\consolai.ttf",
            "C:\\Windows\\Fonts\\consolaz.ttf",
        )
    }

    /// File used for the style of `pattern`.
    pub fn path_for(&self, pattern: &FontPattern) -> &Path {
        match pattern.style_name() {
            "bold italic" => &self.bold_italic,
            "italic" => &self.italic,
            "bold" => &self.bold,
            _ => &self.regular,
        }
    }
}

impl FontLocator for StyleTableLocator {
    fn locate(&self, pattern: &FontPattern) -> Vec<FontSource> {
        vec![FontSource::new(self.path_for(pattern))]
    }
}
