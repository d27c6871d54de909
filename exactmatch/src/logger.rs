// exactmatch/src/logger.rs
//! Logger setup for the CLI.
//!
//! `RUST_LOG` is honoured unless an explicit level is passed, which is how
//! `--debug` and `--quiet` win over the environment.

use log::LevelFilter;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes `env_logger` once. Later calls are no-ops.
pub fn init_logger(level: Option<LevelFilter>) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
        if let Some(level) = level {
            builder.filter_level(level);
        }
        builder
            .format(|buf, record| writeln!(buf, "[{}] {} - {}", record.level(), record.target(), record.args()))
            .target(env_logger::Target::Stderr)
            .init();
    });
}

/// The level requested by the global flags. `--quiet` wins over `--debug`.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}
