use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Failures reported by a [`HostApplication`](super::HostApplication).
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Camera '{name}' not found")]
    CameraNotFound { name: String },
    #[error("Host does not support {operation}")]
    Unsupported { operation: &'static str },
    #[error("{message}")]
    Failed { message: String },
    #[error("failed to read scene file {path}: {source}")]
    SceneRead {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse scene file {path}: {source}")]
    SceneParse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures raised while running a code payload.
///
/// Resource exhaustion keeps its own variants so callers can tell a scene
/// that is too heavy apart from a broken payload.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Out of memory - scene too complex for this operation")]
    OutOfMemory,
    #[error("Operation too complex - recursion limit exceeded")]
    RecursionLimit,
    #[error("Scene dependency error: {message}. Try with a simpler scene.")]
    Dependency { message: String },
    #[error("Code execution failed: {message}")]
    Failed { message: String },
    #[error("Code execution is disabled on this host")]
    Disabled,
}

impl ExecutionError {
    /// Builds an [`ExecutionError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Builds an [`ExecutionError::Dependency`].
    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency {
            message: message.into(),
        }
    }
}
