//! Command dispatch for the host server.
//!
//! Requests travel from a connection thread through the single-consumer
//! [`queue`](self::queue) to the [`CommandRegistry`], so handlers never run
//! concurrently. The connection handler owns the per-connection state machine
//! that reads one frame, waits for the dispatched result and writes it back.
//!
//! ```json
//! {"command":"list_cameras","params":{}}
//! {"success":true,"cameras":[],"count":0,"active_camera":null}
//! ```

mod errors;
mod handler;
mod queue;
mod registry;

pub use self::errors::CommandError;
pub(crate) use self::handler::{ConnectionSettings, DispatchConnectionHandler};
pub use self::queue::{CommandPump, DispatchSender, PumpReport, QueueClosed, dispatch_queue};
pub use self::registry::{CommandHandler, CommandRegistry, RegistryBuilder};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
