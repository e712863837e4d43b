//! Shared configuration for the hostlink server and client.
//!
//! Both binaries load the same [`Config`] through `ortho_config`, layering
//! defaults, an optional TOML file, `HOSTLINK_*` environment variables and
//! command-line flags (in increasing order of precedence). The helpers here
//! convert the raw millisecond fields into [`Duration`] values and group the
//! server-facing and client-facing settings so each side only sees what it
//! uses.

mod defaults;
mod endpoint;
mod framing;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_HOST, DEFAULT_LOG_FILTER,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_REQUEST_BYTES, DEFAULT_PORT, DEFAULT_READ_TIMEOUT_MS,
    DEFAULT_RENDER_TIMEOUT_MS, DEFAULT_RETRY_DELAY_MS, default_log_filter, default_log_format,
};
pub use endpoint::{EndpointResolveError, ServerEndpoint};
pub use framing::{Framing, FramingParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Layered configuration shared by `hostlinkd` and `hostlink`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HOSTLINK")]
pub struct Config {
    /// Host the server binds to and the client connects to.
    #[serde(default = "defaults::default_host")]
    pub host: String,
    /// TCP port of the server.
    #[serde(default = "defaults::default_port")]
    pub port: u16,
    /// Frame decoder used by the server when reading requests.
    #[serde(default)]
    pub framing: Framing,
    /// Server-side timeout applied to every read of a request.
    #[serde(default = "defaults::default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Largest request frame the server accepts.
    #[serde(default = "defaults::default_max_request_bytes")]
    pub max_request_bytes: usize,
    /// Client connect timeout.
    #[serde(default = "defaults::default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Client deadline for receiving a complete response.
    #[serde(default = "defaults::default_command_timeout_ms")]
    pub command_timeout_ms: u64,
    /// Client deadline used for render-class commands.
    #[serde(default = "defaults::default_render_timeout_ms")]
    pub render_timeout_ms: u64,
    /// Number of attempts the client makes per call.
    #[serde(default = "defaults::default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between client attempts.
    #[serde(default = "defaults::default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// `tracing` filter expression.
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "defaults::default_log_format")]
    pub log_format: LogFormat,
    /// JSON scene description served by the static host.
    #[serde(default)]
    pub scene_file: Option<Utf8PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: defaults::default_host(),
            port: DEFAULT_PORT,
            framing: Framing::default(),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            render_timeout_ms: DEFAULT_RENDER_TIMEOUT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            log_filter: defaults::default_log_filter_string(),
            log_format: default_log_format(),
            scene_file: None,
        }
    }
}

impl Config {
    /// Loads configuration from files, environment and process arguments.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load().map_err(ConfigError::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the transport unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid("host", "must not be empty"));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("max_attempts", "must be at least 1"));
        }
        if self.max_request_bytes == 0 {
            return Err(ConfigError::invalid(
                "max_request_bytes",
                "must be greater than zero",
            ));
        }
        let timeouts = [
            ("read_timeout_ms", self.read_timeout_ms),
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("command_timeout_ms", self.command_timeout_ms),
            ("render_timeout_ms", self.render_timeout_ms),
        ];
        if let Some((field, _)) = timeouts.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::invalid(field, "must be greater than zero"));
        }
        Ok(())
    }

    /// Endpoint described by `host` and `port`.
    #[must_use]
    pub fn endpoint(&self) -> ServerEndpoint {
        ServerEndpoint::new(self.host.clone(), self.port)
    }

    /// Server frame decoder mode.
    #[must_use]
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Per-read timeout applied by the server.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Largest request the server accepts.
    #[must_use]
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }

    /// Client connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Client response deadline for ordinary commands.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Client response deadline for render-class commands.
    #[must_use]
    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    /// Number of attempts per client call.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fixed delay between client attempts.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Configured log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Scene description file, when configured.
    #[must_use]
    pub fn scene_file(&self) -> Option<&camino::Utf8Path> {
        self.scene_file.as_deref()
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One of the configuration layers failed to load or merge.
    #[error("failed to load configuration: {0}")]
    Load(Arc<OrthoError>),
    /// A field holds a value the transport cannot work with.
    #[error("invalid configuration value for '{field}': {reason}")]
    Invalid {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &str, reason: &str) -> Self {
        Self::Invalid {
            field: field.to_owned(),
            reason: reason.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn defaults_match_transport_contract() {
        let config = Config::default();
        assert_eq!(config.endpoint().to_string(), "tcp://127.0.0.1:8765");
        assert_eq!(config.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.command_timeout(), Duration::from_secs(60));
        assert_eq!(config.render_timeout(), Duration::from_secs(120));
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.framing(), Framing::Delimited);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case::attempts(Config { max_attempts: 0, ..Config::default() }, "max_attempts")]
    #[case::host(Config { host: String::from("  "), ..Config::default() }, "host")]
    #[case::read_timeout(Config { read_timeout_ms: 0, ..Config::default() }, "read_timeout_ms")]
    #[case::command_timeout(
        Config { command_timeout_ms: 0, ..Config::default() },
        "command_timeout_ms"
    )]
    #[case::request_limit(
        Config { max_request_bytes: 0, ..Config::default() },
        "max_request_bytes"
    )]
    fn validate_rejects_unusable_values(#[case] config: Config, #[case] expected_field: &str) {
        let error = config.validate().expect_err("config should be rejected");
        match error {
            ConfigError::Invalid { field, .. } => assert_eq!(field, expected_field),
            ConfigError::Load(other) => panic!("unexpected load error: {other}"),
        }
    }
}
