//! Font pattern parsing.
//!
//! Accepted forms:
//! - `family[:token]*` (fontconfig-like), e.g. `"Fira Code:bold:italic"`,
//!   `"Iosevka:weight=300"`, `"Hack:style=Bold Italic"`
//! - `family [style words]`, e.g. `"monospace bold italic"`
//! - a direct path to a font file (see [`FontPattern::is_font_file`])

/// File suffixes recognized as direct font file references.
const FONT_FILE_SUFFIXES: &[&str] = &[".ttf", ".otf", ".ttc", ".otc"];

const WEIGHT_REGULAR: u16 = 400;
const WEIGHT_BOLD: u16 = 700;

/// Weight at and above which a pattern counts as bold.
const BOLD_THRESHOLD: u16 = 600;

/// Requested family, either a concrete name or a generic class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontFamily {
    Named(String),
    Monospace,
    SansSerif,
    Serif,
    Cursive,
    Fantasy,
}

impl FontFamily {
    fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "" | "monospace" | "mono" => FontFamily::Monospace,
            "sans-serif" | "sans" => FontFamily::SansSerif,
            "serif" => FontFamily::Serif,
            "cursive" => FontFamily::Cursive,
            "fantasy" => FontFamily::Fantasy,
            _ => FontFamily::Named(name.to_string()),
        }
    }
}

/// Slant of the requested face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSlant {
    #[default]
    Upright,
    Italic,
    Oblique,
}

/// A parsed, human-readable font request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontPattern {
    pub family: FontFamily,
    /// CSS-style weight, 1..=1000
    pub weight: u16,
    pub slant: FontSlant,
}

impl Default for FontPattern {
    fn default() -> Self {
        Self {
            family: FontFamily::Monospace,
            weight: WEIGHT_REGULAR,
            slant: FontSlant::Upright,
        }
    }
}

impl FontPattern {
    /// Whether `pattern` names a font file directly rather than a family.
    pub fn is_font_file(pattern: &str) -> bool {
        let lower = pattern.trim().to_ascii_lowercase();
        FONT_FILE_SUFFIXES
            .iter()
            .any(|suffix| lower.len() > suffix.len() && lower.ends_with(suffix))
    }

    /// Parse a family/style pattern. Unknown tokens are ignored.
    pub fn parse(pattern: &str) -> Self {
        let mut parsed = FontPattern::default();
        let mut parts = pattern.trim().split(':');
        let family_part = parts.next().unwrap_or_default().trim();

        if pattern.contains(':') {
            parsed.family = FontFamily::from_name(family_part);
            for token in parts {
                parsed.apply_token(token.trim());
            }
            return parsed;
        }

        // No separators: peel style keywords off the end of the family name.
        let mut words: Vec<&str> = family_part.split_whitespace().collect();
        let mut peeled = Vec::new();
        while let Some(last) = words.last() {
            if keyword_effect(last).is_none() {
                break;
            }
            peeled.push(*last);
            words.pop();
        }
        parsed.family = FontFamily::from_name(&words.join(" "));
        for word in peeled.into_iter().rev() {
            parsed.apply_keyword(word);
        }
        parsed
    }

    pub fn is_bold(&self) -> bool {
        self.weight >= BOLD_THRESHOLD
    }

    pub fn is_italic(&self) -> bool {
        self.slant != FontSlant::Upright
    }

    /// Style keyword in the form used by fixed style tables.
    pub fn style_name(&self) -> &'static str {
        match (self.is_bold(), self.is_italic()) {
            (true, true) => "bold italic",
            (false, true) => "italic",
            (true, false) => "bold",
            (false, false) => "regular",
        }
    }

    fn apply_token(&mut self, token: &str) {
        if token.is_empty() {
            return;
        }
        if let Some((key, value)) = token.split_once('=') {
            match key.trim().to_ascii_lowercase().as_str() {
                "weight" => match value.trim().parse::<u16>() {
                    Ok(weight) => self.weight = weight.clamp(1, 1000),
                    Err(_) => {
                        if !self.apply_keyword(value.trim()) {
                            log::debug!("Ignoring unknown font weight '{}'", value);
                        }
                    }
                },
                "style" | "slant" => {
                    for word in value.split_whitespace() {
                        if !self.apply_keyword(word) {
                            log::debug!("Ignoring unknown font style word '{}'", word);
                        }
                    }
                }
                _ => log::debug!("Ignoring unsupported font pattern property '{}'", token),
            }
            return;
        }
        if !self.apply_keyword(token) {
            log::debug!("Ignoring unknown font pattern token '{}'", token);
        }
    }

    fn apply_keyword(&mut self, word: &str) -> bool {
        match keyword_effect(word) {
            Some(Keyword::Weight(weight)) => self.weight = weight,
            Some(Keyword::Slant(slant)) => self.slant = slant,
            None => return false,
        }
        true
    }
}

enum Keyword {
    Weight(u16),
    Slant(FontSlant),
}

fn keyword_effect(word: &str) -> Option<Keyword> {
    let keyword = match word.to_ascii_lowercase().as_str() {
        "thin" | "hairline" => Keyword::Weight(100),
        "extralight" | "ultralight" => Keyword::Weight(200),
        "light" => Keyword::Weight(300),
        "regular" | "normal" | "book" => Keyword::Weight(WEIGHT_REGULAR),
        "medium" => Keyword::Weight(500),
        "semibold" | "demibold" => Keyword::Weight(600),
        "bold" => Keyword::Weight(WEIGHT_BOLD),
        "extrabold" | "ultrabold" => Keyword::Weight(800),
        "black" | "heavy" => Keyword::Weight(900),
        "italic" => Keyword::Slant(FontSlant::Italic),
        "oblique" => Keyword::Slant(FontSlant::Oblique),
        _ => return None,
    };
    Some(keyword)
}
