//! Integration tests for the glyphrun-fonts crate.

mod common;

use std::path::Path;

use common::{
    FAMILY, FixedLocator, MockEngine, ascii, chars, font_bytes, write_font, write_named_font,
};
use glyphrun_fonts::{
    Codepoint, FontCatalog, FontError, FontHandle, FontList, FontLocator, FontPattern,
    FontSource, HarfBuzzEngine, REPLACEMENT_CHARACTER, ScaleContext, Script, Shaper,
    SystemFontLocator, fnv1a_64,
};
use tempfile::TempDir;

const ADVANCE_X: i32 = 10;

fn catalog_for<P: AsRef<Path>>(paths: &[P]) -> FontCatalog {
    FontCatalog::with_locator(FixedLocator::paths(paths))
}

fn empty_catalog() -> FontCatalog {
    FontCatalog::with_locator(FixedLocator(Vec::new()))
}

fn path_of(catalog: &FontCatalog, list: &FontList, i: usize) -> std::path::PathBuf {
    let id = list.iter().nth(i).expect("font in list");
    catalog.get(id).expect("font in catalog").path().to_path_buf()
}

// ---------------------------------------------------------------------------
// FontHandle
// ---------------------------------------------------------------------------

#[test]
fn test_handle_from_synthetic_font() {
    let path = Path::new("/virtual/Box-Regular.ttf");
    let font = FontHandle::from_bytes(path, font_bytes(&chars("AM")), 0, 16)
        .expect("synthetic font should parse");

    assert_eq!(font.font_size(), 16);
    assert_eq!(font.line_height(), 16);
    assert_eq!(font.baseline(), 3);
    assert_eq!(font.max_advance(), 9);
    assert_eq!(font.bitmap_height(), 16);
    assert_eq!(font.bitmap_width(), 9);
    assert!(font.is_fixed_width());
    assert!(!font.has_color());
    assert_eq!(font.hash_code(), fnv1a_64(b"/virtual/Box-Regular.ttf"));
}

#[test]
fn test_handle_rejects_garbage() {
    let path = Path::new("/virtual/garbage.ttf");
    assert!(FontHandle::from_bytes(path, vec![0u8; 100], 0, 16).is_none());
    assert!(FontHandle::from_bytes(path, Vec::new(), 0, 16).is_none());
    assert!(FontHandle::load(Path::new("/nonexistent/glyphrun.ttf"), 0, 16).is_none());
}

#[test]
fn test_handle_glyph_lookup() {
    let path = Path::new("/virtual/lookup.ttf");
    let font = FontHandle::from_bytes(path, font_bytes(&chars("BA")), 0, 16).expect("font");

    // Glyph ids follow codepoint order, .notdef is 0.
    assert_eq!(font.glyph_index('A'), 1);
    assert_eq!(font.glyph_index('B'), 2);
    assert_eq!(font.glyph_index('C'), 0);
    assert_eq!(font.glyph_index(REPLACEMENT_CHARACTER), 0);
}

#[test]
fn test_set_size_is_idempotent_and_keeps_identity() {
    let path = Path::new("/virtual/resize.ttf");
    let mut font = FontHandle::from_bytes(path, font_bytes(&ascii()), 0, 16).expect("font");
    let hash = font.hash_code();
    let line_height = font.line_height();

    font.set_size(16);
    assert_eq!(font.line_height(), line_height);

    font.set_size(32);
    assert_eq!(font.font_size(), 32);
    assert_eq!(font.line_height(), 32);
    assert_eq!(font.bitmap_height(), 32);
    assert_eq!(font.hash_code(), hash);

    font.set_size(0);
    assert_eq!(font.font_size(), 1);
}

#[test]
fn test_rasterize_outline_glyph() {
    let path = Path::new("/virtual/raster.ttf");
    let font = FontHandle::from_bytes(path, font_bytes(&chars("A")), 0, 32).expect("font");
    let mut context = ScaleContext::new();

    let bitmap = font
        .rasterize(&mut context, font.glyph_index('A'))
        .expect("box glyph should rasterize");
    assert!(bitmap.width > 0 && bitmap.height > 0);
    assert!(!bitmap.is_color);
    assert_eq!(bitmap.pixels.len(), (bitmap.width * bitmap.height) as usize);
}

// ---------------------------------------------------------------------------
// FontCatalog
// ---------------------------------------------------------------------------

#[test]
fn test_load_direct_font_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_font(dir.path(), "Direct.ttf", &ascii());
    let mut catalog = empty_catalog();

    let list = catalog
        .load(path.to_str().expect("utf-8 path"), 16)
        .expect("direct file should load");

    assert!(list.fallbacks.is_empty());
    let font = catalog.get(list.primary).expect("primary");
    assert_eq!(font.path(), path.as_path());
    assert_eq!(font.font_size(), 16);
    assert_eq!(catalog.find(&path), Some(list.primary));
}

#[test]
fn test_same_path_at_new_size_resizes_in_place() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_font(dir.path(), "Resize.ttf", &ascii());
    let pattern = path.to_str().expect("utf-8 path");
    let mut catalog = empty_catalog();

    let first = catalog.load(pattern, 16).expect("first load");
    let hash = catalog.get(first.primary).expect("font").hash_code();

    let second = catalog.load(pattern, 24).expect("second load");
    assert_eq!(first.primary, second.primary);
    assert_eq!(catalog.len(), 1);

    let font = catalog.get(second.primary).expect("font");
    assert_eq!(font.hash_code(), hash);
    assert_eq!(font.font_size(), 24);
    // The earlier list aliases the resized handle.
    assert_eq!(catalog.get(first.primary).expect("font").font_size(), 24);
}

#[test]
fn test_fallback_order_is_preserved() {
    let dir = TempDir::new().expect("temp dir");
    let primary = write_font(dir.path(), "Primary.ttf", &ascii());
    let cjk = write_font(dir.path(), "Cjk.ttf", &chars("漢字"));
    let emoji = write_font(dir.path(), "Emoji.ttf", &['\u{1F600}']);
    let mut catalog = catalog_for(&[&primary, &cjk, &emoji]);

    let list = catalog.load("monospace", 16).expect("load");
    assert_eq!(list.len(), 3);
    assert_eq!(path_of(&catalog, &list, 0), primary);
    assert_eq!(path_of(&catalog, &list, 1), cjk);
    assert_eq!(path_of(&catalog, &list, 2), emoji);
}

#[test]
fn test_unloadable_and_repeated_fallbacks_are_skipped() {
    let dir = TempDir::new().expect("temp dir");
    let primary = write_font(dir.path(), "Primary.ttf", &ascii());
    let missing = dir.path().join("Missing.ttf");
    let broken = dir.path().join("Broken.ttf");
    std::fs::write(&broken, b"not a font").expect("write");
    let symbols = write_font(dir.path(), "Symbols.ttf", &['★']);

    let mut catalog = FontCatalog::with_locator(FixedLocator(vec![
        FontSource::new(&primary),
        FontSource::new(&missing),
        FontSource::new(&broken),
        FontSource::new(&symbols),
        FontSource::new(&primary),
        FontSource::new(&symbols),
    ]));

    let list = catalog.load("monospace", 16).expect("load");
    assert_eq!(list.fallbacks.len(), 1);
    assert_eq!(path_of(&catalog, &list, 1), symbols);
    assert_eq!(catalog.len(), 2);
}

#[test]
fn test_no_candidates_is_fatal() {
    let mut catalog = empty_catalog();
    match catalog.load("Definitely Not Installed", 16) {
        Err(FontError::NoFontFound { pattern, .. }) => {
            assert_eq!(pattern, "Definitely Not Installed")
        }
        Ok(list) => panic!("expected NoFontFound, got {list:?}"),
    }
}

#[test]
fn test_broken_primary_is_fatal_even_with_fallbacks() {
    let dir = TempDir::new().expect("temp dir");
    let broken = dir.path().join("Broken.ttf");
    std::fs::write(&broken, b"not a font").expect("write");
    let fallback = write_font(dir.path(), "Fallback.ttf", &ascii());
    let mut catalog = catalog_for(&[&broken, &fallback]);

    let err = catalog.load("monospace", 16).unwrap_err();
    assert!(matches!(err, FontError::NoFontFound { .. }));
    assert!(err.to_string().contains("monospace"));
}

// ---------------------------------------------------------------------------
// Shaper fallback search (mock engine)
// ---------------------------------------------------------------------------

struct Fixture {
    _dir: TempDir,
    catalog: FontCatalog,
    list: FontList,
}

/// Primary covers ASCII (plus U+FFFD when `replacement`), first fallback
/// covers Greek, second covers CJK.
fn fixture(replacement: bool) -> Fixture {
    let dir = TempDir::new().expect("temp dir");
    let mut primary_chars = ascii();
    if replacement {
        primary_chars.push(REPLACEMENT_CHARACTER);
    }
    let primary = write_font(dir.path(), "Primary.ttf", &primary_chars);
    let greek = write_font(dir.path(), "Greek.ttf", &chars("αβγλ"));
    let cjk = write_font(dir.path(), "Cjk.ttf", &chars("漢字"));
    let mut catalog = catalog_for(&[&primary, &greek, &cjk]);
    let list = catalog.load("monospace", 16).expect("load");
    Fixture {
        _dir: dir,
        catalog,
        list,
    }
}

fn shape_mock(
    shaper: &mut Shaper<MockEngine>,
    fx: &Fixture,
    text: &str,
) -> glyphrun_fonts::GlyphPositionList {
    shaper.shape(
        &fx.catalog,
        Script::Common,
        &fx.list,
        ADVANCE_X,
        0,
        &Codepoint::run(text),
    )
}

fn tried(shaper: &Shaper<MockEngine>, fx: &Fixture) -> Vec<usize> {
    shaper
        .engine()
        .calls
        .iter()
        .map(|path| {
            fx.list
                .iter()
                .position(|id| fx.catalog.get(id).map(|f| f.path()) == Some(path.as_path()))
                .expect("call against a listed font")
        })
        .collect()
}

#[test]
fn test_primary_coverage_never_consults_fallbacks() {
    let fx = fixture(false);
    let mut shaper = Shaper::with_engine(MockEngine::default());

    let glyphs = shape_mock(&mut shaper, &fx, "hello");
    assert_eq!(glyphs.len(), 5);
    assert!(!glyphs.has_missing());
    assert!(glyphs.iter().all(|g| g.font == fx.list.primary));
    assert_eq!(tried(&shaper, &fx), vec![0]);
    assert_eq!(shaper.cached_fonts(), 1);
}

#[test]
fn test_first_covering_fallback_wins() {
    let fx = fixture(false);
    let mut shaper = Shaper::with_engine(MockEngine::default());

    let glyphs = shape_mock(&mut shaper, &fx, "漢字");
    assert_eq!(tried(&shaper, &fx), vec![0, 1, 2]);
    assert!(!glyphs.has_missing());
    assert!(glyphs.iter().all(|g| g.font == fx.list.fallbacks[1]));

    let glyphs = shape_mock(&mut shaper, &fx, "λ");
    assert_eq!(glyphs[0].font, fx.list.fallbacks[0]);
    assert_eq!(shaper.cached_fonts(), 3);
}

#[test]
fn test_mixed_run_not_covered_by_one_font_degrades() {
    let fx = fixture(true);
    let mut shaper = Shaper::with_engine(MockEngine::default());

    // No single font covers both Latin and Han.
    let glyphs = shape_mock(&mut shaper, &fx, "a漢");
    assert_eq!(tried(&shaper, &fx), vec![0, 1, 2, 0]);
    assert_eq!(glyphs.len(), 2);
    assert!(glyphs.iter().all(|g| g.font == fx.list.primary));
    assert_ne!(glyphs[0].glyph_index, glyphs[1].glyph_index);
}

#[test]
fn test_degrade_substitutes_replacement_glyph() {
    let fx = fixture(true);
    let mut shaper = Shaper::with_engine(MockEngine::default());
    let replacement = fx
        .catalog
        .get(fx.list.primary)
        .expect("primary")
        .glyph_index(REPLACEMENT_CHARACTER);
    assert_ne!(replacement, 0);

    let glyphs = shape_mock(&mut shaper, &fx, "A\u{1F600}B");
    assert_eq!(glyphs.len(), 3);
    assert!(!glyphs.has_missing());
    assert_eq!(glyphs[1].glyph_index, replacement);
    assert_ne!(glyphs[0].glyph_index, replacement);
    assert_eq!(glyphs[1].cluster, 1);
}

#[test]
fn test_degrade_without_replacement_keeps_sentinel() {
    let fx = fixture(false);
    let mut shaper = Shaper::with_engine(MockEngine::default());

    let glyphs = shape_mock(&mut shaper, &fx, "\u{1F600}");
    assert_eq!(glyphs.len(), 1);
    assert_eq!(glyphs[0].glyph_index, 0);
    assert_eq!(glyphs[0].cluster, 0);
}

#[test]
fn test_shaping_is_deterministic() {
    let fx = fixture(true);
    let mut shaper = Shaper::with_engine(MockEngine::default());

    for text in ["hello", "αβ", "a漢\u{1F600}"] {
        let first = shape_mock(&mut shaper, &fx, text);
        let second = shape_mock(&mut shaper, &fx, text);
        assert_eq!(first, second);
    }
}

#[test]
fn test_contexts_are_created_once_per_font() {
    let fx = fixture(false);
    let mut shaper = Shaper::with_engine(MockEngine::default());

    for _ in 0..3 {
        shape_mock(&mut shaper, &fx, "漢");
    }
    assert_eq!(shaper.engine().contexts_created, 3);
    // Only the first call searches; the repeats are served from the run cache.
    assert_eq!(shaper.engine().calls.len(), 3);
    assert_eq!(shaper.cached_runs(), 1);
}

#[test]
fn test_run_cache_key_covers_gap_and_size() {
    let mut fx = fixture(false);
    let mut shaper = Shaper::with_engine(MockEngine::default());

    let first = shape_mock(&mut shaper, &fx, "ab");
    assert_eq!(shaper.engine().calls.len(), 1);

    let shifted = shaper.shape(
        &fx.catalog,
        Script::Common,
        &fx.list,
        ADVANCE_X,
        2,
        &Codepoint::run("ab"),
    );
    assert_eq!(shaper.engine().calls.len(), 2);
    assert_eq!(shifted[0].cluster, 2);
    assert_ne!(first, shifted);

    // Same list at a new size resolves to the same ids but must be reshaped.
    fx.list = fx.catalog.load("monospace", 32).expect("reload");
    shape_mock(&mut shaper, &fx, "ab");
    assert_eq!(shaper.engine().calls.len(), 3);
    assert_eq!(shaper.cached_runs(), 3);

    shaper.clear_cache();
    assert_eq!(shaper.cached_runs(), 0);
}

#[test]
fn test_run_cache_evicts_least_recent() {
    let fx = fixture(false);
    let mut shaper = Shaper::with_cache_size(MockEngine::default(), 1);

    shape_mock(&mut shaper, &fx, "a");
    shape_mock(&mut shaper, &fx, "b");
    assert_eq!(shaper.cached_runs(), 1);

    shape_mock(&mut shaper, &fx, "a");
    assert_eq!(shaper.engine().calls.len(), 3);

    // A zero capacity still keeps the most recent run.
    let mut shaper = Shaper::with_cache_size(MockEngine::default(), 0);
    shape_mock(&mut shaper, &fx, "a");
    shape_mock(&mut shaper, &fx, "a");
    assert_eq!(shaper.engine().calls.len(), 1);
}

#[test]
fn test_huge_cluster_gap_saturates() {
    let fx = fixture(false);
    let mut shaper = Shaper::with_engine(MockEngine::default());

    let glyphs = shaper.shape(
        &fx.catalog,
        Script::Latin,
        &fx.list,
        ADVANCE_X,
        u32::MAX,
        &Codepoint::run("AB"),
    );
    assert_eq!(glyphs.len(), 2);
    assert!(glyphs.iter().all(|g| g.cluster == u32::MAX));
    assert!(glyphs.iter().all(|g| g.x == i32::MAX));
}

#[test]
fn test_clear_cache_does_not_change_output() {
    let fx = fixture(true);
    let mut shaper = Shaper::with_engine(MockEngine::default());

    let before = shape_mock(&mut shaper, &fx, "Aλ漢");
    assert_eq!(shaper.cached_fonts(), 3);

    shaper.clear_cache();
    assert_eq!(shaper.cached_fonts(), 0);

    let after = shape_mock(&mut shaper, &fx, "Aλ漢");
    assert_eq!(before, after);
    assert_eq!(shaper.engine().contexts_created, 6);
}

#[test]
fn test_cluster_gap_and_offsets_position_glyphs() {
    let fx = fixture(false);
    let engine = MockEngine {
        x_offset: 128,
        ..MockEngine::default()
    };
    let mut shaper = Shaper::with_engine(engine);

    let glyphs = shaper.shape(
        &fx.catalog,
        Script::Latin,
        &fx.list,
        ADVANCE_X,
        3,
        &Codepoint::run("AB"),
    );
    assert_eq!(glyphs.len(), 2);
    assert_eq!((glyphs[0].cluster, glyphs[0].x), (3, 32));
    assert_eq!((glyphs[1].cluster, glyphs[1].x), (4, 42));
    assert_eq!(glyphs.to_string(), format!(
        "{{x:32 y:0 i:{} c:3}} {{x:42 y:0 i:{} c:4}}",
        glyphs[0].glyph_index, glyphs[1].glyph_index
    ));
}

#[test]
fn test_rejected_fonts_are_skipped() {
    let fx = fixture(true);
    let primary_path = fx.catalog.get(fx.list.primary).expect("primary").path().to_path_buf();
    let greek_path = fx
        .catalog
        .get(fx.list.fallbacks[0])
        .expect("greek")
        .path()
        .to_path_buf();

    let mut engine = MockEngine::default();
    engine.rejected.insert(primary_path);
    let mut shaper = Shaper::with_engine(engine);

    // Primary unusable: a covering fallback still wins.
    let glyphs = shape_mock(&mut shaper, &fx, "λ");
    assert_eq!(glyphs[0].font, fx.list.fallbacks[0]);
    assert!(!glyphs.has_missing());

    // Nothing usable covers the run: one replacement glyph per codepoint.
    let mut engine = MockEngine::default();
    engine.rejected.insert(
        fx.catalog.get(fx.list.primary).expect("primary").path().to_path_buf(),
    );
    engine.rejected.insert(greek_path);
    let mut shaper = Shaper::with_engine(engine);
    let glyphs = shape_mock(&mut shaper, &fx, "\u{1F600}\u{1F601}");
    assert_eq!(glyphs.len(), 2);
    assert_eq!(glyphs[1].x, ADVANCE_X);
    let replacement = fx
        .catalog
        .get(fx.list.primary)
        .expect("primary")
        .glyph_index(REPLACEMENT_CHARACTER);
    assert!(glyphs.iter().all(|g| g.glyph_index == replacement));
}

// ---------------------------------------------------------------------------
// Shaper with rustybuzz
// ---------------------------------------------------------------------------

#[test]
fn test_harfbuzz_shapes_latin_letter() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_font(dir.path(), "Latin.ttf", &ascii());
    let mut catalog = catalog_for(&[&path]);
    let list = catalog.load("monospace", 16).expect("load");
    let mut shaper = Shaper::new();

    let glyphs = shaper.shape(&catalog, Script::Latin, &list, ADVANCE_X, 0, &Codepoint::run("A"));
    assert_eq!(glyphs.len(), 1);
    assert_ne!(glyphs[0].glyph_index, 0);
    assert_eq!(glyphs[0].cluster, 0);
    assert_eq!(glyphs[0].x, 0);
    assert_eq!(glyphs[0].y, 0);
    assert_eq!(glyphs[0].font, list.primary);
}

#[test]
fn test_harfbuzz_emoji_without_coverage_is_sentinel() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_font(dir.path(), "Latin.ttf", &ascii());
    let mut catalog = catalog_for(&[&path]);
    let list = catalog.load("monospace", 16).expect("load");
    let mut shaper = Shaper::new();

    let glyphs = shaper.shape(
        &catalog,
        Script::Common,
        &list,
        ADVANCE_X,
        0,
        &[Codepoint::new('\u{1F600}', 0)],
    );
    assert_eq!(glyphs.len(), 1);
    assert_eq!(glyphs[0].glyph_index, 0);
}

#[test]
fn test_harfbuzz_falls_back_across_fonts() {
    let dir = TempDir::new().expect("temp dir");
    let primary = write_font(dir.path(), "Latin.ttf", &ascii());
    let cjk = write_font(dir.path(), "Cjk.ttf", &chars("漢字"));
    let mut catalog = catalog_for(&[&primary, &cjk]);
    let list = catalog.load("monospace", 16).expect("load");
    let mut shaper = Shaper::with_engine(HarfBuzzEngine::with_features(&["liga", "-calt"]));
    assert_eq!(shaper.engine().feature_count(), 2);

    let glyphs = shaper.shape(&catalog, Script::Han, &list, ADVANCE_X, 5, &Codepoint::run("漢字"));
    assert_eq!(glyphs.len(), 2);
    assert!(glyphs.iter().all(|g| g.font == list.fallbacks[0]));
    assert_eq!(glyphs[0].cluster, 5);
    assert_eq!(glyphs[1].x, 6 * ADVANCE_X);

    shaper.clear_cache();
    let again = shaper.shape(&catalog, Script::Han, &list, ADVANCE_X, 5, &Codepoint::run("漢字"));
    assert_eq!(glyphs, again);
}

// ---------------------------------------------------------------------------
// System fonts (skipped on hosts without any)
// ---------------------------------------------------------------------------

#[test]
fn test_system_monospace_resolves_when_fonts_exist() {
    let locator = SystemFontLocator::new();
    if locator.font_count() == 0 {
        eprintln!("no system fonts installed; skipping");
        return;
    }

    let mut catalog = FontCatalog::with_locator(locator);
    let Ok(list) = catalog.load("monospace", 16) else {
        eprintln!("no monospace face installed; skipping");
        return;
    };
    let primary = catalog.get(list.primary).expect("primary");
    assert!(!primary.path().as_os_str().is_empty());
    assert_eq!(primary.font_size(), 16);

    let mut shaper = Shaper::new();
    let glyphs = shaper.shape(&catalog, Script::Latin, &list, 8, 0, &Codepoint::run("A"));
    assert_eq!(glyphs.len(), 1);
    assert_eq!(glyphs[0].cluster, 0);
}

// ---------------------------------------------------------------------------
// SystemFontLocator against a private database
// ---------------------------------------------------------------------------

fn database_with<P: AsRef<Path>>(paths: &[P]) -> fontdb::Database {
    let mut db = fontdb::Database::new();
    for path in paths {
        db.load_font_file(path.as_ref()).expect("load synthetic font");
    }
    db
}

#[test]
fn test_locator_matches_named_family() {
    let dir = TempDir::new().expect("temp dir");
    let wanted = write_named_font(dir.path(), "Wanted.ttf", FAMILY, &ascii());
    let other = write_named_font(dir.path(), "Other.ttf", "Other Mono", &ascii());
    let locator = SystemFontLocator::with_database(database_with(&[&other, &wanted]))
        .with_fallback_families(Vec::new());
    assert_eq!(locator.font_count(), 2);

    let candidates = locator.locate(&FontPattern::parse(FAMILY));
    assert_eq!(candidates, vec![FontSource::new(&wanted)]);
}

#[test]
fn test_locator_substitutes_missing_family() {
    let dir = TempDir::new().expect("temp dir");
    let installed = write_named_font(dir.path(), "Installed.ttf", FAMILY, &ascii());
    let locator = SystemFontLocator::with_database(database_with(&[&installed]))
        .with_fallback_families(vec![FAMILY.to_string()]);

    let candidates = locator.locate(&FontPattern::parse("No Such Family bold"));
    assert_eq!(candidates, vec![FontSource::new(&installed)]);

    let mut catalog = FontCatalog::with_locator(locator);
    let list = catalog.load("No Such Family", 16).expect("substituted");
    assert_eq!(path_of(&catalog, &list, 0), installed);
    assert!(list.fallbacks.is_empty());
}
