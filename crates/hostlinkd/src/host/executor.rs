use serde_json::Value;

use super::{ExecutionError, HostApplication};

/// Runs externally supplied code payloads inside the host.
pub trait CodeExecutor: Send + Sync {
    /// Executes `code`. The payload may publish a value through
    /// [`ExecutionScope::set_result`].
    fn execute(&self, code: &str, scope: &mut ExecutionScope<'_>) -> Result<(), ExecutionError>;
}

/// Restricted environment handed to a payload: the host API and a result
/// slot, nothing else.
pub struct ExecutionScope<'host> {
    host: &'host dyn HostApplication,
    result: Option<Value>,
}

impl<'host> ExecutionScope<'host> {
    /// Builds an empty scope over `host`.
    #[must_use]
    pub fn new(host: &'host dyn HostApplication) -> Self {
        Self { host, result: None }
    }

    /// Host the payload may query.
    #[must_use]
    pub fn host(&self) -> &'host dyn HostApplication {
        self.host
    }

    /// Publishes the payload result.
    pub fn set_result(&mut self, value: impl Into<Value>) {
        self.result = Some(value.into());
    }

    /// Takes the published result, if any.
    pub fn take_result(&mut self) -> Option<Value> {
        self.result.take()
    }
}
