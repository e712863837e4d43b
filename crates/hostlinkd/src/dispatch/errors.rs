//! Errors returned by command handlers.

use thiserror::Error;

use crate::host::{ExecutionError, HostError};

/// Failure reported by a command handler.
///
/// The display text becomes the `error` field of the response.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A parameter is missing or has the wrong shape.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
    /// The host application rejected the operation.
    #[error(transparent)]
    Host(#[from] HostError),
    /// A code payload failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// The command failed for a handler-specific reason.
    #[error("{message}")]
    Failed { message: String },
}

impl CommandError {
    /// Builds an [`CommandError::InvalidParameter`].
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }

    /// Builds a [`CommandError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}
