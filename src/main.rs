use anyhow::Result;
use clap::Parser;
use glyphrun::cli::{self, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // --log-level takes precedence over RUST_LOG, which beats the config (applied below).
    glyphrun::debug::init_log_bridge(cli.log_level.map(cli::LogLevelArg::to_level_filter));

    let result = cli::load_config(cli.config.as_ref()).and_then(|config| {
        glyphrun::debug::apply_config_level(config.log_level.to_level_filter());
        log::info!("Starting glyphrun {}", env!("CARGO_PKG_VERSION"));
        cli::process_cli(&cli, &config)
    });

    if let Err(ref e) = result {
        eprintln!("glyphrun: error: {e:#}");
    }
    result
}
