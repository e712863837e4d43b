//! Explicit owner of a running host server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use hostlink_config::{Config, ServerEndpoint};
use thiserror::Error;
use tracing::{info, warn};

use crate::dispatch::{
    CommandPump, CommandRegistry, ConnectionSettings, DispatchConnectionHandler, DispatchSender,
    dispatch_queue,
};
use crate::transport::{ListenerError, ListenerHandle, SocketListener};

const SERVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::server");

/// Errors raised while starting or stopping a [`HostServer`].
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to start socket listener: {source}")]
    Listener {
        #[source]
        source: ListenerError,
    },
    #[error("failed to spawn dispatch worker: {source}")]
    SpawnWorker {
        #[source]
        source: std::io::Error,
    },
    #[error("dispatch worker panicked")]
    WorkerPanic,
    #[error("server is already running on {addr}")]
    AlreadyRunning { addr: SocketAddr },
}

impl From<ListenerError> for ServerError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}

enum DispatchControl {
    Worker {
        sender: DispatchSender,
        worker: JoinHandle<()>,
    },
    HostPumped {
        sender: DispatchSender,
    },
}

struct Running {
    listener: ListenerHandle,
    dispatch: DispatchControl,
}

impl Running {
    fn teardown(self) -> Result<(), ServerError> {
        self.listener.shutdown();
        let listener_result = self.listener.join();
        let worker_result = match self.dispatch {
            DispatchControl::Worker { sender, worker } => {
                sender.stop();
                worker.join().map_err(|_| ServerError::WorkerPanic)
            }
            DispatchControl::HostPumped { sender } => {
                sender.stop();
                Ok(())
            }
        };
        listener_result?;
        worker_result
    }
}

/// Returns the address of a live server, first tearing down one whose
/// accept loop has already exited.
fn live_address(state: &mut Option<Running>) -> Option<SocketAddr> {
    let running = state.as_ref()?;
    if running.listener.is_active() {
        return Some(running.listener.local_addr());
    }
    let stale = state.take()?;
    let addr = stale.listener.local_addr();
    warn!(target: SERVER_TARGET, %addr, "accept loop exited; discarding stale server");
    if let Err(error) = stale.teardown() {
        warn!(target: SERVER_TARGET, %addr, %error, "stale server did not stop cleanly");
    }
    None
}

/// Listener, dispatch queue and command table with an explicit lifecycle.
///
/// [`start`](Self::start) and [`stop`](Self::stop) are idempotent. Dropping
/// the server stops it.
pub struct HostServer {
    endpoint: ServerEndpoint,
    settings: ConnectionSettings,
    registry: Arc<CommandRegistry>,
    state: Mutex<Option<Running>>,
}

impl HostServer {
    /// Builds a stopped server for `config` serving `registry`.
    #[must_use]
    pub fn new(config: &Config, registry: CommandRegistry) -> Self {
        Self {
            endpoint: config.endpoint(),
            settings: ConnectionSettings::from_config(config),
            registry: Arc::new(registry),
            state: Mutex::new(None),
        }
    }

    /// Starts serving with an internal dispatch worker and returns the bound
    /// address. Calling it again while running returns the same address. A
    /// server whose accept loop has exited is torn down and started afresh.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the socket cannot be bound or a thread
    /// cannot be spawned.
    pub fn start(&self) -> Result<SocketAddr, ServerError> {
        let mut state = self.lock_state();
        if let Some(addr) = live_address(&mut state) {
            return Ok(addr);
        }
        let (sender, pump) = dispatch_queue(Arc::clone(&self.registry));
        let worker = thread::Builder::new()
            .name(String::from("hostlink-dispatch"))
            .spawn(move || pump.run_until_stopped())
            .map_err(|source| ServerError::SpawnWorker { source })?;
        let listener = match self.start_listener(sender.clone()) {
            Ok(listener) => listener,
            Err(error) => {
                sender.stop();
                if worker.join().is_err() {
                    warn!(target: SERVER_TARGET, "dispatch worker panicked during rollback");
                }
                return Err(error);
            }
        };
        let addr = listener.local_addr();
        *state = Some(Running {
            listener,
            dispatch: DispatchControl::Worker { sender, worker },
        });
        info!(target: SERVER_TARGET, %addr, "host server started");
        Ok(addr)
    }

    /// Starts serving and hands the [`CommandPump`] to the caller, who must
    /// drain it (for example from the host's main loop) for requests to run.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyRunning`] when the server is running, or
    /// a listener error when the socket cannot be bound.
    pub fn start_host_pumped(&self) -> Result<(SocketAddr, CommandPump), ServerError> {
        let mut state = self.lock_state();
        if let Some(addr) = live_address(&mut state) {
            return Err(ServerError::AlreadyRunning { addr });
        }
        let (sender, pump) = dispatch_queue(Arc::clone(&self.registry));
        let listener = self.start_listener(sender.clone())?;
        let addr = listener.local_addr();
        *state = Some(Running {
            listener,
            dispatch: DispatchControl::HostPumped { sender },
        });
        info!(target: SERVER_TARGET, %addr, "host server started with host-driven dispatch");
        Ok((addr, pump))
    }

    /// Stops accepting, closes the listening socket and stops dispatch.
    /// Stopping a stopped server does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the accept loop or dispatch worker
    /// panicked.
    pub fn stop(&self) -> Result<(), ServerError> {
        let Some(running) = self.lock_state().take() else {
            return Ok(());
        };
        let addr = running.listener.local_addr();
        let result = running.teardown();
        info!(target: SERVER_TARGET, %addr, "host server stopped");
        result
    }

    /// Address of the listening socket while running.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock_state()
            .as_ref()
            .map(|running| running.listener.local_addr())
    }

    /// Whether the server is accepting connections.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_state()
            .as_ref()
            .is_some_and(|running| running.listener.is_active())
    }

    /// The command table served by this server.
    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    fn start_listener(&self, sender: DispatchSender) -> Result<ListenerHandle, ServerError> {
        let listener = SocketListener::bind(&self.endpoint)?;
        let handler = Arc::new(DispatchConnectionHandler::new(sender, self.settings));
        Ok(listener.start(handler)?)
    }

    /// Ends the accept loop without tearing the server down, leaving it in
    /// the state a fatal accept error does.
    #[cfg(test)]
    pub(crate) fn halt_accept_loop(&self) {
        if let Some(running) = self.lock_state().as_ref() {
            running.listener.shutdown();
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, Option<Running>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for HostServer {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!(target: SERVER_TARGET, %error, "host server did not stop cleanly");
        }
    }
}
