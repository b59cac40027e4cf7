//! glyphrun: font resolution, fallback shaping and glyph rasterization for
//! terminal renderers.
//!
//! The heavy lifting lives in the workspace crates:
//! - `glyphrun-fonts`: font catalog, locators and the fallback shaper
//! - `glyphrun-config`: YAML configuration
//! - `glyphrun-render`: glyph and image caches on the renderer side
//!
//! This crate ties them together in a [`FontSession`](session::FontSession)
//! and exposes them through the `glyphrun` command-line tool.

pub mod cli;
pub mod debug;
pub mod session;

pub use session::{FontSession, ScriptRun, SessionPatterns, TextStyle, script_runs};
