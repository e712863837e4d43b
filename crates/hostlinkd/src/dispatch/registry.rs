//! Name to handler table with a fault boundary around every call.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use hostlink_protocol::{Params, Request, Response};
use tracing::{debug, warn};

use super::{CommandError, DISPATCH_TARGET};

/// A named command implementation.
pub trait CommandHandler: Send + Sync {
    /// Runs the command with the request parameters.
    fn handle(&self, params: &Params) -> Result<Response, CommandError>;
}

impl<F> CommandHandler for F
where
    F: Fn(&Params) -> Result<Response, CommandError> + Send + Sync,
{
    fn handle(&self, params: &Params) -> Result<Response, CommandError> {
        self(params)
    }
}

/// Immutable command table.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CommandRegistry")
            .field("commands", &self.commands())
            .finish()
    }
}

impl CommandRegistry {
    /// Starts an empty registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Whether `name` has a handler.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered command names in sorted order.
    #[must_use]
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Runs the handler for `request`.
    ///
    /// Unknown commands, handler errors and handler panics all come back as
    /// failure responses.
    #[must_use]
    pub fn dispatch(&self, request: &Request) -> Response {
        let command = request.command();
        let Some(handler) = self.handlers.get(command) else {
            debug!(target: DISPATCH_TARGET, command, "unknown command");
            return Response::error(format!("Unknown command: {command}"));
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(request.params())));
        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                debug!(target: DISPATCH_TARGET, command, %error, "command failed");
                Response::error(error.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(target: DISPATCH_TARGET, command, panic = %message, "command panicked");
                Response::error(format!("Command processing failed: {message}"))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("handler panicked")
    }
}

/// Collects handlers before the server starts.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl RegistryBuilder {
    /// Registers `handler` under `name`. A later registration replaces an
    /// earlier one.
    #[must_use]
    pub fn register<H>(mut self, name: impl Into<String>, handler: H) -> Self
    where
        H: CommandHandler + 'static,
    {
        let name = name.into();
        if self.handlers.insert(name.clone(), Arc::new(handler)).is_some() {
            warn!(
                target: DISPATCH_TARGET,
                command = %name,
                "command registered twice; keeping the latest handler"
            );
        }
        self
    }

    /// Freezes the table.
    #[must_use]
    pub fn build(self) -> CommandRegistry {
        CommandRegistry {
            handlers: self.handlers,
        }
    }
}
