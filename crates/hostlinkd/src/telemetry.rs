//! Routes the server's `tracing` events to stderr.
//!
//! The host application usually owns stdout, so every record goes to stderr.
//! Only the first successful call installs a subscriber; an embedding host
//! that restarts the server keeps the subscriber it already has.

use std::io::{self, IsTerminal};

use hostlink_config::Config;
use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::{self, time::UtcTime};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Proof that server diagnostics have somewhere to go.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Why server diagnostics could not be set up.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `log_filter` is not a valid `EnvFilter` directive list.
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        #[source]
        source: ParseError,
    },
    /// Another global subscriber was installed first.
    #[error("failed to install telemetry subscriber: {source}")]
    Subscriber {
        #[source]
        source: SetGlobalDefaultError,
    },
}

/// Checks the configured filter, then installs the subscriber once per
/// process.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for a bad filter on every call, and
/// [`TelemetryError::Subscriber`] if a foreign subscriber already owns the
/// global slot.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    INSTALLED
        .get_or_try_init(|| install(config, filter))
        .map(|_| TelemetryHandle)
}

fn parse_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|source| TelemetryError::Filter {
        filter: directives.to_owned(),
        source,
    })
}

fn install(config: &Config, filter: EnvFilter) -> Result<(), TelemetryError> {
    let stderr_is_tty = io::stderr().is_terminal();
    let base = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(stderr_is_tty)
        .with_thread_names(true)
        .with_timer(UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = if config.log_format().is_structured() {
        Box::new(base.json().flatten_event(true).finish())
    } else {
        Box::new(base.compact().finish())
    };
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|source| TelemetryError::Subscriber { source })
}
