//! Retry decisions and the fixed-delay attempt loop.

use std::thread;
use std::time::Duration;

use backoff::backoff::{Backoff, Constant};
use hostlink_protocol::Response;
use tracing::warn;

use super::CLIENT_TARGET;
use super::errors::{TransportError, TransportErrorKind};

/// Which transport failures trigger another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    connect_failed: bool,
    send_failed: bool,
    receive_timeout: bool,
    connection_lost: bool,
    decode_failed: bool,
}

impl Default for RetryPolicy {
    /// Retries failures that happen before the host could have acted on the
    /// request, and never retries timeouts or undecodable replies.
    fn default() -> Self {
        Self {
            connect_failed: true,
            send_failed: true,
            receive_timeout: false,
            connection_lost: true,
            decode_failed: false,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries every kind of failure.
    #[must_use]
    pub const fn retrying_all() -> Self {
        Self {
            connect_failed: true,
            send_failed: true,
            receive_timeout: true,
            connection_lost: true,
            decode_failed: true,
        }
    }

    /// Policy that never retries.
    #[must_use]
    pub const fn never() -> Self {
        Self {
            connect_failed: false,
            send_failed: false,
            receive_timeout: false,
            connection_lost: false,
            decode_failed: false,
        }
    }

    /// Overrides the decision for one kind.
    #[must_use]
    pub fn with(mut self, kind: TransportErrorKind, retry: bool) -> Self {
        match kind {
            TransportErrorKind::ConnectFailed => self.connect_failed = retry,
            TransportErrorKind::SendFailed => self.send_failed = retry,
            TransportErrorKind::ReceiveTimeout => self.receive_timeout = retry,
            TransportErrorKind::ConnectionLost => self.connection_lost = retry,
            TransportErrorKind::DecodeFailed => self.decode_failed = retry,
        }
        self
    }

    /// Whether a failure of `kind` is retried.
    #[must_use]
    pub const fn retries(&self, kind: TransportErrorKind) -> bool {
        match kind {
            TransportErrorKind::ConnectFailed => self.connect_failed,
            TransportErrorKind::SendFailed => self.send_failed,
            TransportErrorKind::ReceiveTimeout => self.receive_timeout,
            TransportErrorKind::ConnectionLost => self.connection_lost,
            TransportErrorKind::DecodeFailed => self.decode_failed,
        }
    }
}

/// Attempt budget and pacing for one call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetrySchedule {
    pub(crate) max_attempts: u32,
    pub(crate) delay: Duration,
}

/// Runs `attempt` until it succeeds, fails with a non-retryable error or the
/// attempt budget runs out.
///
/// Exhausting the budget on connect failures yields
/// [`TransportError::Exhausted`]; any other last failure is returned as-is.
pub(crate) fn run_with_retry<F>(
    policy: RetryPolicy,
    schedule: RetrySchedule,
    command: &str,
    mut attempt: F,
) -> Result<Response, TransportError>
where
    F: FnMut(u32) -> Result<Response, TransportError>,
{
    let max_attempts = schedule.max_attempts.max(1);
    let mut delays = Constant::new(schedule.delay);
    let mut number = 1;
    loop {
        let error = match attempt(number) {
            Ok(response) => return Ok(response),
            Err(error) => error,
        };
        if !policy.retries(error.kind()) {
            return Err(error);
        }
        if number >= max_attempts {
            return Err(match error.kind() {
                TransportErrorKind::ConnectFailed => TransportError::Exhausted {
                    attempts: max_attempts,
                },
                _ => error,
            });
        }
        let delay = delays.next_backoff().unwrap_or(schedule.delay);
        warn!(
            target: CLIENT_TARGET,
            command,
            attempt = number,
            max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            kind = %error.kind(),
            %error,
            "attempt failed; retrying"
        );
        thread::sleep(delay);
        number += 1;
    }
}
