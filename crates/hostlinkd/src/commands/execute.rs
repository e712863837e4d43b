use std::sync::Arc;

use hostlink_protocol::{Params, Response};
use tracing::info;

use crate::dispatch::{CommandError, CommandHandler, DISPATCH_TARGET};
use crate::host::{CodeExecutor, ExecutionError, ExecutionScope, HostApplication};

use super::params::required_str;

/// `execute_code`: forwards a payload to the installed executor.
pub struct ExecuteCode {
    host: Arc<dyn HostApplication>,
    executor: Option<Arc<dyn CodeExecutor>>,
}

impl ExecuteCode {
    #[must_use]
    pub fn new(host: Arc<dyn HostApplication>, executor: Option<Arc<dyn CodeExecutor>>) -> Self {
        Self { host, executor }
    }
}

impl CommandHandler for ExecuteCode {
    fn handle(&self, params: &Params) -> Result<Response, CommandError> {
        let code = required_str(params, "code")?;
        let executor = self.executor.as_ref().ok_or(ExecutionError::Disabled)?;
        info!(
            target: DISPATCH_TARGET,
            bytes = code.len(),
            "executing code payload"
        );
        let mut scope = ExecutionScope::new(self.host.as_ref());
        executor.execute(code, &mut scope)?;
        // A null result counts as unset.
        Ok(match scope.take_result().filter(|result| !result.is_null()) {
            Some(result) => Response::ok().with_field("result", result),
            None => Response::ok().with_field("message", "Code executed successfully"),
        })
    }
}
