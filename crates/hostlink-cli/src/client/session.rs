//! One request attempt: connect, send, receive against a deadline, decode.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::{Duration, Instant};

use hostlink_config::ServerEndpoint;
use hostlink_protocol::{
    FrameDecoder, Framing, ReceiveError, Request, Response, decode_response, encode_request,
    read_frame,
};
use tracing::debug;

use super::CLIENT_TARGET;
use super::errors::TransportError;

/// Largest response the client buffers; rendered images travel inline.
pub(crate) const MAX_RESPONSE_BYTES: usize = 256 * 1024 * 1024;

/// Timeouts governing a single attempt.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionTimeouts {
    pub(crate) connect: Duration,
    pub(crate) response: Duration,
}

/// A single connection used for exactly one request and one response.
pub(crate) struct RequestSession<'a> {
    endpoint: &'a ServerEndpoint,
    timeouts: SessionTimeouts,
}

impl<'a> RequestSession<'a> {
    pub(crate) fn new(endpoint: &'a ServerEndpoint, timeouts: SessionTimeouts) -> Self {
        Self { endpoint, timeouts }
    }

    /// Runs the attempt to completion.
    pub(crate) fn run(&self, request: &Request) -> Result<Response, TransportError> {
        let payload =
            encode_request(request).map_err(|source| TransportError::Encode { source })?;
        let mut stream = self.connect()?;
        send(&mut stream, &payload)?;
        let frame = self.receive(stream)?;
        decode_response(&frame).map_err(|source| TransportError::Decode { source })
    }

    fn address(&self) -> String {
        format!("{}:{}", self.endpoint.host(), self.endpoint.port())
    }

    fn connect(&self) -> Result<TcpStream, TransportError> {
        let address = self.address();
        let target = self
            .endpoint
            .resolve()
            .map_err(|error| TransportError::Connect {
                address: address.clone(),
                source: error.into_io(),
            })?;
        let stream = TcpStream::connect_timeout(&target, self.timeouts.connect)
            .map_err(|source| TransportError::Connect { address, source })?;
        if let Err(error) = stream.set_nodelay(true) {
            debug!(target: CLIENT_TARGET, %error, "failed to disable Nagle's algorithm");
        }
        Ok(stream)
    }

    fn receive(&self, stream: TcpStream) -> Result<Vec<u8>, TransportError> {
        let timeout = self.timeouts.response;
        let mut reader = DeadlineStream::new(stream, timeout);
        let decoder = FrameDecoder::new(Framing::Delimited, MAX_RESPONSE_BYTES);
        read_frame(&mut reader, decoder).map_err(|error| match error {
            ReceiveError::Timeout => TransportError::Timeout { timeout },
            ReceiveError::Closed => TransportError::EmptyResponse,
            ReceiveError::Io { source } => TransportError::ConnectionLost { source },
            ReceiveError::Decode(source) => TransportError::Decode { source },
        })
    }
}

fn send(stream: &mut TcpStream, payload: &[u8]) -> Result<(), TransportError> {
    stream
        .write_all(payload)
        .and_then(|()| stream.flush())
        .map_err(|source| TransportError::Send { source })?;
    if let Err(error) = stream.shutdown(Shutdown::Write) {
        debug!(target: CLIENT_TARGET, %error, "failed to half-close request stream");
    }
    Ok(())
}

/// Reader that enforces one deadline across every read on the stream.
pub(crate) struct DeadlineStream {
    inner: TcpStream,
    deadline: Instant,
}

impl DeadlineStream {
    pub(crate) fn new(inner: TcpStream, timeout: Duration) -> Self {
        Self {
            inner,
            deadline: Instant::now() + timeout,
        }
    }
}

impl Read for DeadlineStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(io::Error::from(io::ErrorKind::TimedOut));
        }
        self.inner.set_read_timeout(Some(remaining))?;
        self.inner.read(buf)
    }
}
