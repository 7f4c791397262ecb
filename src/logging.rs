//! Subscriber setup for the mirrorgen binary
//!
//! The library only emits `tracing` events; embedders install their own
//! subscriber. The CLI calls [`init_logging`] once at startup.

use std::sync::OnceLock;

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INSTALLED: OnceLock<LevelFilter> = OnceLock::new();

/// Verbosity selected with `--log-level`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[value(alias = "silent")]
    Off,
    Error,
    #[value(alias = "warning")]
    Warn,
    /// Per-package summaries and skipped declarations
    #[default]
    Info,
    /// Adds every written file and each dropped field
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Install a stderr subscriber whose default level is `level`; `RUST_LOG`
/// directives refine it.
///
/// Returns the level actually in effect, which is the one from the first call.
pub fn init_logging(level: LogLevel) -> LevelFilter {
    *INSTALLED.get_or_init(|| {
        let default = LevelFilter::from(level);
        let filter = EnvFilter::builder()
            .with_default_directive(default.into())
            .from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .compact()
                    .with_target(false)
                    .without_time(),
            )
            .try_init();
        default
    })
}
