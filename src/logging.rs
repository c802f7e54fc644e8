//! Tracing subscriber setup.
//!
//! Command-line invocations log to stderr so stdout stays machine-readable.
//! The TUI owns the terminal, so it logs to a daily-rotated file in the config
//! directory instead.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ResolvedConfig, ValueSource};

/// Environment variable holding a full `EnvFilter` directive.
pub const LOG_ENV: &str = "TW_LOG";

/// Level used for plain CLI commands when nothing else is configured.
pub const CLI_DEFAULT_LEVEL: &str = "warn";

/// Prefix of the TUI log files.
pub const LOG_FILE_PREFIX: &str = "tw.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    Stderr,
    /// Daily-rotated files in the given directory
    File(&'a Path),
}

/// Level for plain CLI commands.
///
/// A level set by flag or config.kdl wins; otherwise [`CLI_DEFAULT_LEVEL`].
pub fn command_level(settings: &ResolvedConfig) -> &str {
    match settings.log_level.source {
        ValueSource::Default => CLI_DEFAULT_LEVEL,
        _ => settings.log_level(),
    }
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(CLI_DEFAULT_LEVEL))
}

/// Install the global subscriber.
///
/// `TW_LOG` takes precedence over `level`. The returned guard must be held
/// until exit when logging to a file, or buffered lines are lost. Calling this
/// twice is harmless; the second call is ignored.
pub fn init(level: &str, target: LogTarget<'_>) -> Option<WorkerGuard> {
    let registry = tracing_subscriber::registry().with(filter(level));
    match target {
        LogTarget::Stderr => {
            let _ = registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .try_init();
            None
        }
        LogTarget::File(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(writer),
                )
                .try_init();
            Some(guard)
        }
    }
}
