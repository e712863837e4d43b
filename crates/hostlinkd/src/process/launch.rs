//! Sequences bootstrap, serving and shutdown.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};

use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::PROCESS_TARGET;

/// Runs the server with production collaborators until a termination signal
/// arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, startup or shutdown fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        &SystemShutdownSignal,
    )
}

/// Runs the server with injected collaborators.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, startup or shutdown fails.
pub fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let daemon = bootstrap_with(loader, Arc::clone(&reporter))?;
    let server = daemon.server();
    info!(
        target: PROCESS_TARGET,
        commands = ?server.registry().commands(),
        "starting host server"
    );
    let addr = server.start()?;
    reporter.server_started(addr);

    let waited = shutdown.wait();
    reporter.server_stopping();
    server.stop()?;
    reporter.server_stopped();
    waited?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
