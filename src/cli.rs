//! Command-line interface for glyphrun.
//!
//! Each subcommand opens a [`FontSession`] from the loaded configuration,
//! with `--font`/`--size` overriding the configured pattern and size.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glyphrun_config::Config;
use glyphrun_fonts::FontList;
use glyphrun_render::RenderCache;

use crate::session::{FontSession, TextStyle};

/// glyphrun - font resolution and text shaping for terminal renderers
#[derive(Parser)]
#[command(name = "glyphrun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: ~/.config/glyphrun/config.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set log level (overrides config and RUST_LOG)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a font pattern and print the primary and fallback fonts
    Resolve {
        /// Font pattern (family with style words, or a font file path)
        pattern: Option<String>,

        /// Font size in pixels
        #[arg(long, value_name = "PIXELS")]
        size: Option<u32>,
    },

    /// Shape text and print the positioned glyphs
    Shape {
        /// Text to shape
        text: String,

        /// Font pattern to shape with
        #[arg(long, value_name = "PATTERN")]
        font: Option<String>,

        /// Font size in pixels
        #[arg(long, value_name = "PIXELS")]
        size: Option<u32>,

        /// Use the bold font list
        #[arg(long)]
        bold: bool,

        /// Use the italic font list
        #[arg(long)]
        italic: bool,
    },

    /// Shape and rasterize text, printing each glyph bitmap's placement
    Raster {
        /// Text to rasterize
        text: String,

        /// Font pattern to rasterize with
        #[arg(long, value_name = "PATTERN")]
        font: Option<String>,

        /// Font size in pixels
        #[arg(long, value_name = "PIXELS")]
        size: Option<u32>,

        /// Use the bold font list
        #[arg(long)]
        bold: bool,

        /// Use the italic font list
        #[arg(long)]
        italic: bool,
    },
}

/// Read the configuration named on the command line, or the default file.
pub fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load().context("Failed to load config"),
    }
}

/// Apply `--font`/`--size` overrides and re-check the result.
fn with_overrides(config: &Config, font: Option<&str>, size: Option<u32>) -> Result<Config> {
    let mut config = config.clone();
    if let Some(font) = font {
        config.font_family = font.to_string();
    }
    if let Some(size) = size {
        config.font_size = size;
    }
    config.validate().context("Invalid font override")?;
    Ok(config)
}

/// Run a parsed subcommand, writing its report to `out`.
pub fn run(command: &Commands, config: &Config, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Resolve { pattern, size } => {
            let config = with_overrides(config, pattern.as_deref(), *size)?;
            let session = FontSession::open(&config)?;
            write_resolve(&session, out)
        }
        Commands::Shape {
            text,
            font,
            size,
            bold,
            italic,
        } => {
            let config = with_overrides(config, font.as_deref(), *size)?;
            let mut session = FontSession::open(&config)?;
            let glyphs = session.shape_text(text, TextStyle::new(*bold, *italic));
            for glyph in glyphs.iter() {
                let path = session
                    .catalog()
                    .get(glyph.font)
                    .map(|font| font.path().display().to_string())
                    .unwrap_or_default();
                writeln!(out, "{glyph} {path}")?;
            }
            Ok(())
        }
        Commands::Raster {
            text,
            font,
            size,
            bold,
            italic,
        } => {
            let config = with_overrides(config, font.as_deref(), *size)?;
            let mut session = FontSession::open(&config)?;
            let glyphs = session.shape_text(text, TextStyle::new(*bold, *italic));

            let mut cache = RenderCache::new(config.glyph_cache_capacity);
            cache.begin_frame();
            let placed = cache.rasterize_run(session.catalog(), &glyphs);
            for glyph in &placed {
                writeln!(
                    out,
                    "x:{} y:{} {}x{}{}",
                    glyph.x,
                    glyph.y,
                    glyph.bitmap.width,
                    glyph.bitmap.height,
                    if glyph.bitmap.is_color { " color" } else { "" }
                )?;
            }
            let (hits, misses) = cache.glyphs().stats();
            writeln!(
                out,
                "{} glyphs shaped, {} rasterized ({} cached, {} hits, {} misses)",
                glyphs.len(),
                placed.len(),
                cache.glyphs().len(),
                hits,
                misses
            )?;
            Ok(())
        }
    }
}

fn write_resolve(session: &FontSession, out: &mut impl Write) -> Result<()> {
    writeln!(out, "pattern: {}", session.pattern())?;
    for (slot, id) in session.fonts().iter().enumerate() {
        let Some(font) = session.catalog().get(id) else {
            continue;
        };
        let role = if slot == 0 { "primary" } else { "fallback" };
        writeln!(
            out,
            "{role} {} (face {}) size={} line_height={} baseline={} advance={}{}",
            font.path().display(),
            font.face_index(),
            font.font_size(),
            font.line_height(),
            font.baseline(),
            font.max_advance(),
            if font.has_color() { " color" } else { "" }
        )?;
    }

    let styles = [
        ("bold", TextStyle::Bold),
        ("italic", TextStyle::Italic),
        ("bold-italic", TextStyle::BoldItalic),
    ];
    for (label, style) in styles {
        let fonts = session.fonts_for(style);
        write_list_summary(out, label, session.pattern_for(style), session, fonts)?;
    }
    write_list_summary(out, "emoji", session.emoji_pattern(), session, session.emoji_fonts())?;
    Ok(())
}

/// One line naming a style's pattern and the primary font it resolved to.
fn write_list_summary(
    out: &mut impl Write,
    label: &str,
    pattern: &str,
    session: &FontSession,
    fonts: &FontList,
) -> Result<()> {
    let path = session
        .catalog()
        .get(fonts.primary)
        .map(|font| font.path().display().to_string())
        .unwrap_or_default();
    writeln!(
        out,
        "{label}: {pattern} -> {path} (+{} fallbacks)",
        fonts.fallbacks.len()
    )?;
    Ok(())
}

/// Run the parsed command, printing to stdout.
pub fn process_cli(cli: &Cli, config: &Config) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&cli.command, config, &mut out)
}
