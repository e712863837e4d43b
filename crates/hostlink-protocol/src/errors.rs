//! Errors raised while encoding, decoding and receiving frames.

use std::io;
use std::str::Utf8Error;

use thiserror::Error;

/// A frame could not be turned into a request or response.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The peer closed the stream before a complete frame arrived.
    #[error("incomplete message")]
    IncompleteMessage,
    /// The frame is not a JSON document.
    #[error("{message}")]
    Malformed {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
    /// The frame is JSON but does not follow the message schema.
    #[error("{message}")]
    Invalid { message: String },
    /// The frame is not valid UTF-8.
    #[error("frame is not valid UTF-8: {source}")]
    InvalidUtf8 {
        #[source]
        source: Utf8Error,
    },
    /// The buffered frame exceeds the configured limit.
    #[error("frame of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

impl DecodeError {
    pub(crate) fn malformed(error: serde_json::Error) -> Self {
        Self::Malformed {
            message: error.to_string(),
            source: Some(error),
        }
    }

    pub(crate) fn empty() -> Self {
        Self::Malformed {
            message: String::from("empty frame"),
            source: None,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Text returned to a peer whose request frame could not be used.
    #[must_use]
    pub fn to_request_error(&self) -> String {
        match self {
            Self::Invalid { message } => format!("Invalid request: {message}"),
            other => format!("Malformed request: {other}"),
        }
    }
}

/// A message could not be serialised.
#[derive(Debug, Error)]
#[error("failed to encode message: {source}")]
pub struct EncodeError {
    #[source]
    source: serde_json::Error,
}

impl From<serde_json::Error> for EncodeError {
    fn from(source: serde_json::Error) -> Self {
        Self { source }
    }
}

/// Reading a frame from a stream failed.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// The read timeout elapsed before a complete frame arrived.
    #[error("timed out waiting for a complete frame")]
    Timeout,
    /// The peer closed the stream without sending anything.
    #[error("stream closed before any bytes were received")]
    Closed,
    /// The received bytes do not form a usable frame.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The stream failed.
    #[error("failed to read frame: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
}
