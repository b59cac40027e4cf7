//! Logging bridge for glyphrun.
//!
//! Routes `log` records to stderr as
//! `[timestamp] [LEVEL] [target] message` lines.
//!
//! Level precedence: `--log-level` flag, then `RUST_LOG` (a bare level such as
//! `debug`), then the `log_level` config setting. The bridge is installed
//! before the config is read, and [`apply_config_level`] settles the final
//! level once it is.

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// Level used until the config has been read.
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

struct LogBridge {
    /// Level requested on the command line, if any
    cli_level: Option<LevelFilter>,
    sink: Mutex<std::io::Stderr>,
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        let mut sink = self.sink.lock();
        let _ = sink.write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = self.sink.lock().flush();
    }
}

static LOGGER: OnceLock<LogBridge> = OnceLock::new();

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Parse `RUST_LOG` when it names a single level; module directives are ignored.
fn env_level(value: Option<&str>) -> Option<LevelFilter> {
    value.and_then(|v| LevelFilter::from_str(v.trim()).ok())
}

/// Effective level for the given sources, highest precedence first.
pub fn resolve_level(
    cli_level: Option<LevelFilter>,
    rust_log: Option<&str>,
    config_level: LevelFilter,
) -> LevelFilter {
    cli_level
        .or_else(|| env_level(rust_log))
        .unwrap_or(config_level)
}

/// Install the bridge as the global `log` logger.
///
/// Calling this more than once keeps the first installation.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let mut installed = false;
    let logger = LOGGER.get_or_init(|| {
        installed = true;
        LogBridge {
            cli_level,
            sink: Mutex::new(std::io::stderr()),
        }
    });
    if !installed {
        return;
    }
    if log::set_logger(logger).is_err() {
        // Another logger won the race (e.g. a test harness); leave it in place.
        return;
    }
    let rust_log = std::env::var("RUST_LOG").ok();
    log::set_max_level(resolve_level(
        logger.cli_level,
        rust_log.as_deref(),
        DEFAULT_LEVEL,
    ));
}

/// Apply the config's `log_level` unless the flag or `RUST_LOG` already chose one.
pub fn apply_config_level(config_level: LevelFilter) {
    let Some(logger) = LOGGER.get() else {
        return;
    };
    let rust_log = std::env::var("RUST_LOG").ok();
    let level = resolve_level(logger.cli_level, rust_log.as_deref(), config_level);
    log::set_max_level(level);
    log::debug!("Log level set to {}", level);
}
