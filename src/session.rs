//! Font session: a catalog, the resolved font lists and a shaper bundled
//! together for shaping whole lines of text.
//!
//! A session resolves one font list per [`TextStyle`] plus an emoji list,
//! all through the same catalog, so a file shared between styles is loaded
//! once.

use anyhow::{Context, Result, bail};
use glyphrun_config::{Config, FontMatcher, MAX_FONT_SIZE, MIN_FONT_SIZE};
use glyphrun_fonts::{
    Codepoint, FontCatalog, FontError, FontHandle, FontList, FontPattern, GlyphPositionList,
    HarfBuzzEngine, Script, Shaper, ShapingEngine, StyleTableLocator, SystemFontLocator,
    is_emoji_presentation,
};
use unicode_segmentation::UnicodeSegmentation;

/// Weight and slant a line of text is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl TextStyle {
    pub const ALL: [TextStyle; 4] = [
        TextStyle::Regular,
        TextStyle::Bold,
        TextStyle::Italic,
        TextStyle::BoldItalic,
    ];

    pub fn new(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => TextStyle::Regular,
            (true, false) => TextStyle::Bold,
            (false, true) => TextStyle::Italic,
            (true, true) => TextStyle::BoldItalic,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Style words added to the regular pattern to derive this style's pattern.
    fn keywords(self) -> Option<&'static str> {
        match self {
            TextStyle::Regular => None,
            TextStyle::Bold => Some("bold"),
            TextStyle::Italic => Some("italic"),
            TextStyle::BoldItalic => Some("bold italic"),
        }
    }
}

/// The patterns a session resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPatterns {
    /// Pattern per style, indexed like [`TextStyle::ALL`]
    pub styles: [String; 4],
    pub emoji: String,
    /// Retried once when the regular pattern resolves to nothing
    pub fallback: String,
}

impl SessionPatterns {
    /// Regular pattern with bold/italic variants derived from it.
    pub fn new(regular: &str, emoji: &str, fallback: &str) -> Self {
        Self {
            styles: TextStyle::ALL.map(|style| derive_style_pattern(regular, style)),
            emoji: emoji.to_string(),
            fallback: fallback.to_string(),
        }
    }

    /// Patterns from configuration; unset style families derive from `font_family`.
    pub fn from_config(config: &Config) -> Self {
        let mut patterns = Self::new(
            &config.font_family,
            &config.emoji_font_family,
            &config.fallback_font_family,
        );
        let overrides = [
            (TextStyle::Bold, &config.font_family_bold),
            (TextStyle::Italic, &config.font_family_italic),
            (TextStyle::BoldItalic, &config.font_family_bold_italic),
        ];
        for (style, family) in overrides {
            if let Some(family) = family.as_deref().filter(|f| !f.trim().is_empty()) {
                patterns.styles[style.index()] = family.to_string();
            }
        }
        patterns
    }

    pub fn style(&self, style: TextStyle) -> &str {
        &self.styles[style.index()]
    }
}

/// `regular` with the style words of `style` appended, in the pattern's own
/// syntax. Font file paths are used for every style as they are.
fn derive_style_pattern(regular: &str, style: TextStyle) -> String {
    let Some(words) = style.keywords() else {
        return regular.to_string();
    };
    if FontPattern::is_font_file(regular) {
        regular.to_string()
    } else if regular.contains(':') {
        format!("{}:{}", regular, words.replace(' ', ":"))
    } else {
        format!("{} {}", regular.trim(), words)
    }
}

/// A consecutive span of graphemes shaped with one script and font list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRun {
    pub script: Script,
    /// Column (grapheme index) of the run's first grapheme within the line
    pub start: u32,
    /// Graphemes with emoji presentation, shaped with the emoji fonts
    pub emoji: bool,
    /// Codepoints with clusters relative to `start`
    pub codepoints: Vec<Codepoint>,
}

/// Split a line into script runs.
///
/// Each grapheme is one column and every codepoint of a grapheme shares its
/// cluster. Neutral graphemes (spaces, punctuation) join the run they appear
/// in; a leading neutral span takes the script of the first real script that
/// follows it. Emoji-presentation graphemes form runs of their own.
pub fn script_runs(text: &str) -> Vec<ScriptRun> {
    let mut runs: Vec<ScriptRun> = Vec::new();
    for (column, grapheme) in text.graphemes(true).enumerate() {
        let column = u32::try_from(column).unwrap_or(u32::MAX);
        let emoji = is_emoji_presentation(grapheme);
        let script = if emoji {
            Script::Common
        } else {
            Script::of_grapheme(grapheme)
        };

        let start_new = match runs.last_mut() {
            None => true,
            Some(run) if run.emoji != emoji => true,
            Some(_) if emoji => false,
            Some(run) if script.is_neutral() || run.script == script => false,
            Some(run) if run.script.is_neutral() => {
                run.script = script;
                false
            }
            Some(_) => true,
        };
        if start_new {
            runs.push(ScriptRun {
                script,
                start: column,
                emoji,
                codepoints: Vec::new(),
            });
        }

        if let Some(run) = runs.last_mut() {
            let cluster = column - run.start;
            run.codepoints
                .extend(grapheme.chars().map(|ch| Codepoint::new(ch, cluster)));
        }
    }
    runs
}

/// A resolved font list and the pattern it came from.
#[derive(Debug, Clone)]
struct LoadedFonts {
    pattern: String,
    fonts: FontList,
}

/// Fonts and shaper state for one text surface.
///
/// The shaper's per-font contexts and shaped runs are released when the
/// session is dropped or the font size changes.
pub struct FontSession<E: ShapingEngine = HarfBuzzEngine> {
    shaper: Shaper<E>,
    catalog: FontCatalog,
    patterns: SessionPatterns,
    /// Indexed like [`TextStyle::ALL`]
    styles: [LoadedFonts; 4],
    emoji: LoadedFonts,
    size: u32,
}

impl FontSession {
    /// Open a session from configuration: pick the font matcher, resolve
    /// `font_family` (or `fallback_font_family` if that fails) with its style
    /// variants and the emoji family, and set up HarfBuzz shaping with the
    /// configured features.
    pub fn open(config: &Config) -> Result<Self> {
        let catalog = match config.font_matcher {
            FontMatcher::System => {
                let locator = SystemFontLocator::new();
                if locator.font_count() == 0 {
                    log::warn!("No system fonts found; only font file paths will resolve");
                }
                FontCatalog::with_locator(locator)
            }
            FontMatcher::StyleTable => {
                let table = &config.style_table;
                FontCatalog::with_locator(StyleTableLocator::new(
                    &table.regular,
                    &table.bold,
                    &table.italic,
                    &table.bold_italic,
                ))
            }
        };
        let shaper = Shaper::with_engine(HarfBuzzEngine::with_features(&config.font_features));
        Self::with_parts(
            catalog,
            shaper,
            SessionPatterns::from_config(config),
            config.font_size,
        )
    }
}

impl<E: ShapingEngine> FontSession<E> {
    /// Build a session from an existing catalog and shaper.
    ///
    /// Only the regular pattern (with its fallback) must resolve; a style or
    /// emoji pattern that fails is replaced by the regular fonts.
    pub fn with_parts(
        mut catalog: FontCatalog,
        shaper: Shaper<E>,
        patterns: SessionPatterns,
        size: u32,
    ) -> Result<Self> {
        let regular = load_with_fallback(
            &mut catalog,
            patterns.style(TextStyle::Regular),
            &patterns.fallback,
            size,
        )?;
        let styles = TextStyle::ALL.map(|style| match style {
            TextStyle::Regular => regular.clone(),
            _ => load_or_regular(&mut catalog, patterns.style(style), &regular, size),
        });
        let emoji = load_or_regular(&mut catalog, &patterns.emoji, &regular, size);
        Ok(Self {
            shaper,
            catalog,
            patterns,
            styles,
            emoji,
            size,
        })
    }

    pub fn catalog(&self) -> &FontCatalog {
        &self.catalog
    }

    /// Regular font list.
    pub fn fonts(&self) -> &FontList {
        self.fonts_for(TextStyle::Regular)
    }

    pub fn fonts_for(&self, style: TextStyle) -> &FontList {
        &self.styles[style.index()].fonts
    }

    pub fn emoji_fonts(&self) -> &FontList {
        &self.emoji.fonts
    }

    pub fn shaper(&self) -> &Shaper<E> {
        &self.shaper
    }

    /// The pattern the regular font list was resolved from.
    pub fn pattern(&self) -> &str {
        self.pattern_for(TextStyle::Regular)
    }

    /// The pattern the font list of `style` was resolved from.
    pub fn pattern_for(&self, style: TextStyle) -> &str {
        &self.styles[style.index()].pattern
    }

    pub fn emoji_pattern(&self) -> &str {
        &self.emoji.pattern
    }

    pub fn font_size(&self) -> u32 {
        self.size
    }

    pub fn primary(&self) -> Option<&FontHandle> {
        self.catalog.get(self.fonts().primary)
    }

    /// Column width in pixels: the regular primary font's widest advance.
    pub fn cell_advance(&self) -> i32 {
        self.primary()
            .map_or(0, |font| i32::try_from(font.max_advance()).unwrap_or(i32::MAX))
    }

    /// Shape a full line in one style, one script run at a time.
    ///
    /// Glyph clusters are grapheme columns within `text`. Emoji runs use the
    /// emoji fonts whatever the style.
    pub fn shape_text(&mut self, text: &str, style: TextStyle) -> GlyphPositionList {
        let advance = self.cell_advance();
        let mut line = GlyphPositionList::new();
        for run in script_runs(text) {
            let fonts = if run.emoji {
                &self.emoji.fonts
            } else {
                &self.styles[style.index()].fonts
            };
            let glyphs = self.shaper.shape(
                &self.catalog,
                run.script,
                fonts,
                advance,
                run.start,
                &run.codepoints,
            );
            line.extend_from(glyphs);
        }
        line
    }

    /// Reload every font list at a new size.
    ///
    /// Shaping contexts and shaped runs are tied to the old size, so they are
    /// dropped first. Sizes outside the configurable range are rejected and
    /// leave the session untouched.
    pub fn set_font_size(&mut self, size: u32) -> Result<()> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
            bail!("Font size {size} is outside {MIN_FONT_SIZE}..={MAX_FONT_SIZE}");
        }
        if size == self.size {
            return Ok(());
        }
        self.shaper.clear_cache();
        let pattern = self.pattern().to_string();
        let fonts = self
            .catalog
            .load(&pattern, size)
            .with_context(|| format!("Failed to reload fonts at size {size}"))?;
        let regular = LoadedFonts { pattern, fonts };
        for style in TextStyle::ALL {
            self.styles[style.index()] = match style {
                TextStyle::Regular => regular.clone(),
                _ => load_or_regular(&mut self.catalog, self.patterns.style(style), &regular, size),
            };
        }
        self.emoji = load_or_regular(&mut self.catalog, &self.patterns.emoji, &regular, size);
        self.size = size;
        log::info!("Font size changed to {}", size);
        Ok(())
    }
}

impl<E: ShapingEngine> Drop for FontSession<E> {
    fn drop(&mut self) {
        self.shaper.clear_cache();
    }
}

fn load_with_fallback(
    catalog: &mut FontCatalog,
    pattern: &str,
    fallback_pattern: &str,
    size: u32,
) -> Result<LoadedFonts> {
    match catalog.load(pattern, size) {
        Ok(fonts) => Ok(LoadedFonts {
            pattern: pattern.to_string(),
            fonts,
        }),
        Err(FontError::NoFontFound { detail, .. }) if fallback_pattern != pattern => {
            log::warn!(
                "Font pattern '{}' unusable ({}); trying '{}'",
                pattern,
                detail,
                fallback_pattern
            );
            let fonts = catalog
                .load(fallback_pattern, size)
                .with_context(|| format!("Fallback font pattern '{fallback_pattern}' failed"))?;
            Ok(LoadedFonts {
                pattern: fallback_pattern.to_string(),
                fonts,
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolve a style or emoji pattern, standing in the regular fonts on failure.
fn load_or_regular(
    catalog: &mut FontCatalog,
    pattern: &str,
    regular: &LoadedFonts,
    size: u32,
) -> LoadedFonts {
    if pattern == regular.pattern {
        return regular.clone();
    }
    match catalog.load(pattern, size) {
        Ok(fonts) => LoadedFonts {
            pattern: pattern.to_string(),
            fonts,
        },
        Err(e) => {
            log::warn!("{}; using '{}' instead", e, regular.pattern);
            regular.clone()
        }
    }
}
