//! Synthetic TrueType fonts for tests.
//!
//! [`font_bytes`] builds a minimal font covering exactly the requested
//! characters: every glyph is a 400x700 unit box on a 600 unit advance,
//! 1000 units per em, with a fixed-pitch `post` table and a `name` table so
//! the system font database can index it.
//!
//! Enabled by the `test-fonts` feature for downstream crates' tests.

use std::path::{Path, PathBuf};

pub const UNITS_PER_EM: u16 = 1000;
pub const ADVANCE: u16 = 600;
pub const ASCENDER: i16 = 800;
pub const DESCENDER: i16 = -200;
/// Family name written by [`font_bytes`].
pub const FAMILY: &str = "Glyphrun Test";

/// Build a TrueType font whose cmap maps each of `chars` to its own glyph.
///
/// Glyph 0 is an empty `.notdef`; covered characters get glyph ids 1.. in
/// ascending codepoint order.
pub fn font_bytes(chars: &[char]) -> Vec<u8> {
    named_font_bytes(FAMILY, chars)
}

/// [`font_bytes`] with `family` as the font's family name.
pub fn named_font_bytes(family: &str, chars: &[char]) -> Vec<u8> {
    let mut chars: Vec<char> = chars.to_vec();
    chars.sort_unstable();
    chars.dedup();
    let num_glyphs = chars.len() as u16 + 1;

    let (glyf, loca) = glyf_and_loca(num_glyphs);
    let tables: Vec<([u8; 4], Vec<u8>)> = vec![
        (*b"cmap", cmap(&chars)),
        (*b"glyf", glyf),
        (*b"head", head()),
        (*b"hhea", hhea(num_glyphs)),
        (*b"hmtx", hmtx(num_glyphs)),
        (*b"loca", loca),
        (*b"maxp", maxp(num_glyphs)),
        (*b"name", name(family)),
        (*b"post", post()),
    ];
    assemble(tables)
}

/// Write a synthetic font covering `chars` to `dir/name`.
///
/// # Panics
/// If the file cannot be written.
pub fn write_font(dir: &Path, name: &str, chars: &[char]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, font_bytes(chars)).expect("write test font");
    path
}

/// Write a synthetic font named `family` covering `chars` to `dir/name`.
///
/// # Panics
/// If the file cannot be written.
pub fn write_named_font(dir: &Path, name: &str, family: &str, chars: &[char]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, named_font_bytes(family, chars)).expect("write test font");
    path
}

/// Characters of `text`, for building coverage sets.
pub fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

/// Printable ASCII.
pub fn ascii() -> Vec<char> {
    (' '..='~').collect()
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_i16(out: &mut Vec<u8>, value: i16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

fn assemble(tables: Vec<([u8; 4], Vec<u8>)>) -> Vec<u8> {
    let num_tables = tables.len() as u16;
    let entry_selector = 15 - num_tables.leading_zeros() as u16;
    let search_range = 16 * (1u16 << entry_selector);

    let mut out = Vec::new();
    push_u32(&mut out, 0x0001_0000);
    push_u16(&mut out, num_tables);
    push_u16(&mut out, search_range);
    push_u16(&mut out, entry_selector);
    push_u16(&mut out, num_tables * 16 - search_range);

    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in &tables {
        out.extend_from_slice(tag);
        push_u32(&mut out, checksum(data));
        push_u32(&mut out, offset as u32);
        push_u32(&mut out, data.len() as u32);

        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        offset = 12 + 16 * tables.len() + body.len();
    }
    out.extend_from_slice(&body);
    out
}

fn head() -> Vec<u8> {
    let mut t = Vec::with_capacity(54);
    push_u32(&mut t, 0x0001_0000); // version
    push_u32(&mut t, 0x0001_0000); // fontRevision
    push_u32(&mut t, 0); // checkSumAdjustment
    push_u32(&mut t, 0x5F0F_3CF5); // magicNumber
    push_u16(&mut t, 0x0003); // flags
    push_u16(&mut t, UNITS_PER_EM);
    t.extend_from_slice(&[0u8; 16]); // created, modified
    push_i16(&mut t, 0); // xMin
    push_i16(&mut t, DESCENDER); // yMin
    push_i16(&mut t, ADVANCE as i16); // xMax
    push_i16(&mut t, ASCENDER); // yMax
    push_u16(&mut t, 0); // macStyle
    push_u16(&mut t, 8); // lowestRecPPEM
    push_i16(&mut t, 2); // fontDirectionHint
    push_i16(&mut t, 0); // indexToLocFormat: short offsets
    push_i16(&mut t, 0); // glyphDataFormat
    t
}

fn hhea(num_glyphs: u16) -> Vec<u8> {
    let mut t = Vec::with_capacity(36);
    push_u32(&mut t, 0x0001_0000);
    push_i16(&mut t, ASCENDER);
    push_i16(&mut t, DESCENDER);
    push_i16(&mut t, 0); // lineGap
    push_u16(&mut t, ADVANCE); // advanceWidthMax
    push_i16(&mut t, 0); // minLeftSideBearing
    push_i16(&mut t, 0); // minRightSideBearing
    push_i16(&mut t, ADVANCE as i16); // xMaxExtent
    push_i16(&mut t, 1); // caretSlopeRise
    push_i16(&mut t, 0); // caretSlopeRun
    push_i16(&mut t, 0); // caretOffset
    t.extend_from_slice(&[0u8; 8]); // reserved
    push_i16(&mut t, 0); // metricDataFormat
    push_u16(&mut t, num_glyphs); // numberOfHMetrics
    t
}

fn hmtx(num_glyphs: u16) -> Vec<u8> {
    let mut t = Vec::new();
    for glyph in 0..num_glyphs {
        push_u16(&mut t, ADVANCE);
        push_i16(&mut t, if glyph == 0 { 0 } else { 100 });
    }
    t
}

fn maxp(num_glyphs: u16) -> Vec<u8> {
    let mut t = Vec::with_capacity(32);
    push_u32(&mut t, 0x0001_0000);
    push_u16(&mut t, num_glyphs);
    push_u16(&mut t, 4); // maxPoints
    push_u16(&mut t, 1); // maxContours
    push_u16(&mut t, 0); // maxCompositePoints
    push_u16(&mut t, 0); // maxCompositeContours
    push_u16(&mut t, 2); // maxZones
    t.extend_from_slice(&[0u8; 16]); // twilight points .. component depth
    t
}

fn post() -> Vec<u8> {
    let mut t = Vec::with_capacity(32);
    push_u32(&mut t, 0x0003_0000);
    push_u32(&mut t, 0); // italicAngle
    push_i16(&mut t, -100); // underlinePosition
    push_i16(&mut t, 50); // underlineThickness
    push_u32(&mut t, 1); // isFixedPitch
    t.extend_from_slice(&[0u8; 16]); // memory usage hints
    t
}

/// Format 0 naming table with the family (1) and PostScript (6) names,
/// UTF-16BE, Windows platform, US English.
fn name(family: &str) -> Vec<u8> {
    let postscript: String = family.chars().filter(|c| !c.is_whitespace()).collect();
    let strings: Vec<(u16, Vec<u8>)> = [(1, family), (6, postscript.as_str())]
        .into_iter()
        .map(|(id, text)| {
            let bytes = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
            (id, bytes)
        })
        .collect();

    let mut t = Vec::new();
    push_u16(&mut t, 0); // format
    push_u16(&mut t, strings.len() as u16);
    push_u16(&mut t, 6 + 12 * strings.len() as u16); // storage offset
    let mut offset = 0u16;
    for (id, bytes) in &strings {
        push_u16(&mut t, 3); // platformID: Windows
        push_u16(&mut t, 1); // encodingID: Unicode BMP
        push_u16(&mut t, 0x0409); // languageID: en-US
        push_u16(&mut t, *id);
        push_u16(&mut t, bytes.len() as u16);
        push_u16(&mut t, offset);
        offset += bytes.len() as u16;
    }
    for (_, bytes) in &strings {
        t.extend_from_slice(bytes);
    }
    t
}

/// Format 12 cmap in a single (3, 10) encoding record, one group per char.
fn cmap(chars: &[char]) -> Vec<u8> {
    let mut t = Vec::new();
    push_u16(&mut t, 0); // version
    push_u16(&mut t, 1); // numTables
    push_u16(&mut t, 3); // platformID: Windows
    push_u16(&mut t, 10); // encodingID: UCS-4
    push_u32(&mut t, 12); // subtable offset

    push_u16(&mut t, 12); // format
    push_u16(&mut t, 0); // reserved
    push_u32(&mut t, 16 + 12 * chars.len() as u32); // length
    push_u32(&mut t, 0); // language
    push_u32(&mut t, chars.len() as u32);
    for (i, &ch) in chars.iter().enumerate() {
        push_u32(&mut t, ch as u32);
        push_u32(&mut t, ch as u32);
        push_u32(&mut t, i as u32 + 1);
    }
    t
}

/// Every glyph but `.notdef` is the same closed box contour.
fn glyf_and_loca(num_glyphs: u16) -> (Vec<u8>, Vec<u8>) {
    let mut box_glyph = Vec::new();
    push_i16(&mut box_glyph, 1); // numberOfContours
    push_i16(&mut box_glyph, 100); // xMin
    push_i16(&mut box_glyph, 0); // yMin
    push_i16(&mut box_glyph, 500); // xMax
    push_i16(&mut box_glyph, 700); // yMax
    push_u16(&mut box_glyph, 3); // endPtsOfContours[0]
    push_u16(&mut box_glyph, 0); // instructionLength
    box_glyph.extend_from_slice(&[0x01; 4]); // on-curve, long x/y deltas
    for dx in [100, 0, 400, 0] {
        push_i16(&mut box_glyph, dx);
    }
    for dy in [0, 700, 0, -700] {
        push_i16(&mut box_glyph, dy);
    }
    if box_glyph.len() % 2 != 0 {
        box_glyph.push(0);
    }

    let mut glyf = Vec::new();
    let mut loca = Vec::new();
    push_u16(&mut loca, 0);
    push_u16(&mut loca, 0); // .notdef has no outline
    for _ in 1..num_glyphs {
        glyf.extend_from_slice(&box_glyph);
        push_u16(&mut loca, (glyf.len() / 2) as u16);
    }
    (glyf, loca)
}
