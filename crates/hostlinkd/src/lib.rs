//! Host-side RPC server for hostlink.
//!
//! A [`HostServer`] runs inside a long-lived host process. It accepts one
//! request per TCP connection, serialises every command through a single
//! dispatch queue and answers with a JSON [`Response`](hostlink_protocol::Response).
//! Commands reach the host only through the [`HostApplication`] and
//! [`CodeExecutor`] traits, so the same server serves a real 3D tool or the
//! file-backed [`StaticHost`] used by the `hostlinkd` binary.
//!
//! Lifecycle events go through a [`HealthReporter`]; everything else is
//! logged with `tracing` under targets prefixed by the crate name.

mod bootstrap;
pub mod commands;
pub mod dispatch;
mod health;
pub mod host;
mod process;
mod server;
pub mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use commands::BuiltinCommands;
pub use dispatch::{CommandError, CommandHandler, CommandPump, CommandRegistry, RegistryBuilder};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use host::{CodeExecutor, ExecutionError, ExecutionScope, HostApplication, HostError, StaticHost};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon, run_daemon_with,
};
pub use server::{HostServer, ServerError};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
