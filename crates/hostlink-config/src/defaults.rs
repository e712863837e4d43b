use crate::logging::LogFormat;

/// Loopback host used when no override is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default TCP port for the host server.
pub const DEFAULT_PORT: u16 = 8765;

/// Server-side per-read timeout in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5_000;

/// Largest request frame accepted by the server.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Client connect timeout in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Client response deadline in milliseconds.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 60_000;

/// Client response deadline for render-class commands in milliseconds.
pub const DEFAULT_RENDER_TIMEOUT_MS: u64 = 120_000;

/// Attempts made by the client for each call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Fixed delay between client attempts in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Filter applied when neither the file nor the environment sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub(crate) fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

pub(crate) fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

pub(crate) const fn default_port() -> u16 {
    DEFAULT_PORT
}

pub(crate) const fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

pub(crate) const fn default_max_request_bytes() -> usize {
    DEFAULT_MAX_REQUEST_BYTES
}

pub(crate) const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

pub(crate) const fn default_command_timeout_ms() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_MS
}

pub(crate) const fn default_render_timeout_ms() -> u64 {
    DEFAULT_RENDER_TIMEOUT_MS
}

pub(crate) const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

pub(crate) const fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}
