//! Transport failures raised while talking to the host server.

use std::fmt;
use std::io;
use std::time::Duration;

use hostlink_protocol::{DecodeError, EncodeError, Response};
use thiserror::Error;

/// Response field naming the kind of a transport failure.
pub const TRANSPORT_ERROR_FIELD: &str = "transport_error";

/// Coarse classification of a [`TransportError`], used for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The server could not be reached.
    ConnectFailed,
    /// The request was not fully written.
    SendFailed,
    /// No complete response arrived before the deadline.
    ReceiveTimeout,
    /// The server dropped the connection.
    ConnectionLost,
    /// The response bytes were not a valid response document.
    DecodeFailed,
}

impl TransportErrorKind {
    /// Every kind, in decision-table order.
    pub const ALL: [Self; 5] = [
        Self::ConnectFailed,
        Self::SendFailed,
        Self::ReceiveTimeout,
        Self::ConnectionLost,
        Self::DecodeFailed,
    ];

    /// Identifier carried in the `transport_error` response field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConnectFailed => "connect_failed",
            Self::SendFailed => "send_failed",
            Self::ReceiveTimeout => "receive_timeout",
            Self::ConnectionLost => "connection_lost",
            Self::DecodeFailed => "decode_failed",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors raised by a single request attempt or by the retry loop.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connecting to the server failed.
    #[error("Cannot connect to host server at {address}: {source}")]
    Connect {
        /// `host:port` of the server.
        address: String,
        #[source]
        source: io::Error,
    },
    /// Every attempt failed to connect.
    #[error("All connection attempts failed")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
    },
    /// The request could not be encoded.
    #[error("Failed to send command: {source}")]
    Encode {
        #[source]
        source: EncodeError,
    },
    /// Writing the request failed.
    #[error("Failed to send command: {source}")]
    Send {
        #[source]
        source: io::Error,
    },
    /// The response deadline elapsed.
    #[error("Command timed out after {} seconds", format_seconds(.timeout))]
    Timeout {
        /// Deadline that elapsed.
        timeout: Duration,
    },
    /// The connection failed while waiting for the response.
    #[error("Connection lost during command execution: {source}")]
    ConnectionLost {
        #[source]
        source: io::Error,
    },
    /// The server closed the connection without writing anything.
    #[error("Empty response from server")]
    EmptyResponse,
    /// The response could not be decoded.
    #[error("Invalid JSON response from server: {source}")]
    Decode {
        #[source]
        source: DecodeError,
    },
}

impl TransportError {
    /// Kind used for retry decisions and the `transport_error` field.
    #[must_use]
    pub const fn kind(&self) -> TransportErrorKind {
        match self {
            Self::Connect { .. } | Self::Exhausted { .. } => TransportErrorKind::ConnectFailed,
            Self::Encode { .. } | Self::Send { .. } => TransportErrorKind::SendFailed,
            Self::Timeout { .. } => TransportErrorKind::ReceiveTimeout,
            Self::ConnectionLost { .. } | Self::EmptyResponse => {
                TransportErrorKind::ConnectionLost
            }
            Self::Decode { .. } => TransportErrorKind::DecodeFailed,
        }
    }

    /// Failure response carrying the message and the error kind.
    #[must_use]
    pub fn to_response(&self) -> Response {
        Response::error(self.to_string()).with_field(TRANSPORT_ERROR_FIELD, self.kind().as_str())
    }
}

/// Renders a deadline in seconds, keeping any fractional part.
fn format_seconds(timeout: &Duration) -> String {
    let nanos = timeout.subsec_nanos();
    if nanos == 0 {
        return timeout.as_secs().to_string();
    }
    let fraction = format!("{nanos:09}");
    format!("{}.{}", timeout.as_secs(), fraction.trim_end_matches('0'))
}
