//! Test harness utilities shared by the server suites.

mod client;
mod config_loader;
mod reporter;

pub use client::{call, send_raw};
pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
