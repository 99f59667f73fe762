//! Tracing subscriber setup.

use crate::config::LogLevel;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

/// Keeps the stderr writer alive and allows swapping the level filter.
pub struct Logging {
    _guard: WorkerGuard,
    handle: reload::Handle<EnvFilter, Registry>,
    env_override: bool,
}

/// Install the global subscriber. The filter comes from `RUST_LOG`, else `info`.
pub fn init() -> Logging {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());

    let env_override = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Logging {
        _guard: guard,
        handle,
        env_override,
    }
}

impl Logging {
    /// Apply the configured level unless `RUST_LOG` was given.
    pub fn apply(&self, level: LogLevel) {
        if self.env_override {
            return;
        }

        match self.handle.reload(EnvFilter::new(level.as_directive())) {
            Ok(()) => tracing::debug!(%level, "log level applied"),
            Err(err) => tracing::warn!(%err, "failed to apply log level"),
        }
    }
}
