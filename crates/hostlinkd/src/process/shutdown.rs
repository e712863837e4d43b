use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Signals that end a standalone `hostlinkd`.
const TERMINATING_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Tells the daemon loop when to stop the host server.
///
/// Embedding hosts supply their own implementation tied to application exit.
pub trait ShutdownSignal: Send + Sync {
    /// Returns once the server should be stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the notification source cannot be set
    /// up; the daemon then stops the server straight away.
    fn wait(&self) -> Result<(), ShutdownError>;
}

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("failed to install signal handlers: {source}")]
    Install {
        #[source]
        source: io::Error,
    },
}

/// Waits for the first terminating Unix signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals = Signals::new(TERMINATING_SIGNALS)
            .map_err(|source| ShutdownError::Install { source })?;
        let received = signals.forever().next();
        info!(
            target: PROCESS_TARGET,
            signal = ?received,
            "stopping host server on signal"
        );
        Ok(())
    }
}
