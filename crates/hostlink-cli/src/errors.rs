//! Error types for the CLI runtime.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use hostlink_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to read code from {path}: {source}")]
    ReadCode {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("--params must be a JSON object: {reason}")]
    InvalidParams { reason: String },
    #[error("failed to serialise response: {0}")]
    SerialiseResponse(serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}
