//! Logging setup for the command-line tool.
//!
//! Logging starts at a default level so configuration loading can log, and
//! is switched to the configured level once the file has been validated.
//! A `RUST_LOG` filter, when set, always wins.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use crate::config::LogLevel;

/// Handle for changing the log level after initialization.
#[derive(Debug, Clone)]
pub struct LogHandle {
    reload: Option<reload::Handle<EnvFilter, Registry>>,
}

impl LogHandle {
    /// Switches to `level` unless `RUST_LOG` pinned the filter.
    pub fn set_level(&self, level: LevelFilter) {
        let Some(handle) = &self.reload else {
            return;
        };
        if let Err(e) = handle.reload(EnvFilter::new(level.to_string())) {
            tracing::warn!(error = %e, "Failed to change log level");
        }
    }
}

/// Picks the effective level from `-v` occurrences and the configured level.
///
/// One `-v` raises the level to at least INFO, two or more to at least
/// DEBUG. `-v` never makes logging quieter than the configured level.
#[must_use]
pub fn effective_level(verbose: u8, configured: LogLevel) -> LevelFilter {
    let configured = configured.as_filter();
    match verbose {
        0 => configured,
        1 => configured.max(LevelFilter::INFO),
        _ => configured.max(LevelFilter::DEBUG),
    }
}

/// Installs the global subscriber.
///
/// Uses `RUST_LOG` when it is set, otherwise `initial`. Returns a handle
/// for applying the configured level later.
pub fn init_logging(initial: LevelFilter) -> LogHandle {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).is_ok_and(|v| !v.trim().is_empty());
    let filter = if from_env {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(initial.to_string())
    };

    let (filter, handle) = reload::Layer::new(filter);
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .is_ok();

    LogHandle {
        reload: (installed && !from_env).then_some(handle),
    }
}
