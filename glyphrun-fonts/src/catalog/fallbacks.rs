//! Families the system locator appends after the best match.
//!
//! Each entry is queried with the requested weight and slant; families that
//! are not installed are skipped. The order groups coverage:
//! 1. Nerd Font symbol sets (powerline, devicons)
//! 2. CJK (Japanese, Simplified/Traditional Chinese, Korean)
//! 3. Monochrome symbol and math fonts
//! 4. Color emoji
//! 5. Broad-coverage general fonts

/// Fallback font families in priority order.
pub const FALLBACK_FAMILIES: &[&str] = &[
    "Symbols Nerd Font Mono",
    "Symbols Nerd Font",
    "Noto Sans Mono CJK JP",
    "Noto Sans CJK JP",
    "Noto Sans CJK SC",
    "Noto Sans CJK TC",
    "Noto Sans CJK KR",
    "Source Han Sans",
    "WenQuanYi Zen Hei",
    "Microsoft YaHei",
    "MS Gothic",
    "Malgun Gothic",
    "Apple Symbols",
    "Segoe UI Symbol",
    "Noto Sans Symbols",
    "Noto Sans Symbols 2",
    "Noto Sans Math",
    "STIX Two Math",
    "Symbola",
    "Noto Color Emoji",
    "Apple Color Emoji",
    "Segoe UI Emoji",
    "Twemoji",
    "DejaVu Sans Mono",
    "DejaVu Sans",
    "Noto Sans Mono",
    "Liberation Mono",
    "Arial Unicode MS",
];
