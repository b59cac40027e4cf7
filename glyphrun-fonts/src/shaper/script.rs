//! Writing-system classification used to pick a shaping hint.
//!
//! Coverage is intentionally small: only a handful of scripts map to an
//! explicit engine hint, everything else is passed as unmapped and the
//! shaping engine guesses from the text itself.

/// Script of a codepoint run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Script {
    /// Digits, punctuation, symbols, box drawing, emoji
    #[default]
    Common,
    /// Combining marks and joiners; takes the script of the preceding text
    Inherited,
    Latin,
    Greek,
    Cyrillic,
    Arabic,
    Hebrew,
    Devanagari,
    Thai,
    Hangul,
    Hiragana,
    Katakana,
    Han,
    Unknown,
}

impl Script {
    /// Classify a single codepoint.
    pub fn of(ch: char) -> Script {
        let cp = ch as u32;
        match cp {
            0x0041..=0x005A | 0x0061..=0x007A => Script::Latin,
            0x0000..=0x007F => Script::Common,
            0x00AA | 0x00BA | 0x00C0..=0x00D6 | 0x00D8..=0x00F6 | 0x00F8..=0x024F => Script::Latin,
            0x0080..=0x00BF | 0x00D7 | 0x00F7 => Script::Common,
            0x0250..=0x02AF | 0x1D00..=0x1D7F | 0x1E00..=0x1EFF | 0x2C60..=0x2C7F => Script::Latin,
            0xA720..=0xA7FF | 0xAB30..=0xAB6F | 0xFB00..=0xFB06 => Script::Latin,
            0xFF21..=0xFF3A | 0xFF41..=0xFF5A => Script::Latin,
            0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF => Script::Inherited,
            0x200C..=0x200D | 0xFE00..=0xFE0F | 0xFE20..=0xFE2F | 0xE0100..=0xE01EF => Script::Inherited,
            0x0370..=0x03FF | 0x1F00..=0x1FFF => Script::Greek,
            0x0400..=0x052F | 0x1C80..=0x1C8F | 0x2DE0..=0x2DFF | 0xA640..=0xA69F => Script::Cyrillic,
            0x0590..=0x05FF | 0xFB1D..=0xFB4F => Script::Hebrew,
            0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF => Script::Arabic,
            0xFB50..=0xFDFF | 0xFE70..=0xFEFF => Script::Arabic,
            0x0900..=0x097F | 0xA8E0..=0xA8FF => Script::Devanagari,
            0x0E00..=0x0E7F => Script::Thai,
            0x1100..=0x11FF | 0x3130..=0x318F | 0xA960..=0xA97F | 0xAC00..=0xD7FF => Script::Hangul,
            0x3041..=0x309F => Script::Hiragana,
            0x30A0..=0x30FF | 0x31F0..=0x31FF | 0xFF66..=0xFF9F => Script::Katakana,
            0x2E80..=0x2FDF | 0x3005 | 0x3007 | 0x3021..=0x3029 | 0x3400..=0x4DBF => Script::Han,
            0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x3FFFF => Script::Han,
            0x2000..=0x2BFF | 0x3000..=0x303F | 0xFF00..=0xFFEF | 0x1F000..=0x1FAFF => Script::Common,
            _ => Script::Unknown,
        }
    }

    /// Classify a grapheme by its first codepoint that carries a real script.
    ///
    /// Graphemes made only of common or inherited codepoints are `Common`.
    pub fn of_grapheme(grapheme: &str) -> Script {
        grapheme
            .chars()
            .map(Script::of)
            .find(|script| !script.is_neutral())
            .unwrap_or(Script::Common)
    }

    /// Whether text in this script may join a run of any other script.
    pub fn is_neutral(self) -> bool {
        matches!(self, Script::Common | Script::Inherited)
    }

    /// ISO 15924 tag handed to the shaping engine, or `None` for scripts
    /// the engine should detect on its own.
    pub fn engine_tag(self) -> Option<&'static str> {
        match self {
            Script::Latin => Some("Latn"),
            Script::Greek => Some("Grek"),
            Script::Cyrillic => Some("Cyrl"),
            Script::Common => Some("Zyyy"),
            _ => None,
        }
    }
}

/// Whether a grapheme is shown as a color emoji by default.
///
/// An explicit variation selector wins (U+FE0F emoji, U+FE0E text);
/// otherwise the first codepoint decides, using the common
/// `Emoji_Presentation` blocks rather than the full property table.
pub fn is_emoji_presentation(grapheme: &str) -> bool {
    if grapheme.contains('\u{FE0E}') {
        return false;
    }
    if grapheme.contains('\u{FE0F}') {
        return true;
    }
    let Some(first) = grapheme.chars().next() else {
        return false;
    };
    matches!(
        first as u32,
        0x231A..=0x231B
            | 0x23E9..=0x23EC
            | 0x23F0
            | 0x23F3
            | 0x25FD..=0x25FE
            | 0x2614..=0x2615
            | 0x2648..=0x2653
            | 0x267F
            | 0x2693
            | 0x26A1
            | 0x26AA..=0x26AB
            | 0x26BD..=0x26BE
            | 0x26C4..=0x26C5
            | 0x26CE
            | 0x26D4
            | 0x26EA
            | 0x26F2..=0x26F3
            | 0x26F5
            | 0x26FA
            | 0x26FD
            | 0x2705
            | 0x270A..=0x270B
            | 0x2728
            | 0x274C
            | 0x274E
            | 0x2753..=0x2755
            | 0x2757
            | 0x2795..=0x2797
            | 0x27B0
            | 0x27BF
            | 0x2B1B..=0x2B1C
            | 0x2B50
            | 0x2B55
            | 0x1F004
            | 0x1F0CF
            | 0x1F18E
            | 0x1F191..=0x1F19A
            | 0x1F1E6..=0x1F1FF
            | 0x1F201
            | 0x1F21A
            | 0x1F22F
            | 0x1F232..=0x1F236
            | 0x1F238..=0x1F23A
            | 0x1F250..=0x1F251
            | 0x1F300..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F7E0..=0x1F7EB
            | 0x1F90C..=0x1F9FF
            | 0x1FA70..=0x1FAFF
    )
}
