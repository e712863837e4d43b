//! Connection handler that serves one request per connection.
//!
//! A connection moves through [`ConnectionPhase`] in order and never loops
//! back: it reads one frame, dispatches it through the queue, writes the
//! response, half-closes and drops the socket.

use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use hostlink_config::{Config, Framing};
use hostlink_protocol::{
    DecodeError, FrameDecoder, ReceiveError, Request, Response, decode_request, encode_response,
    read_frame,
};
use tracing::{debug, trace, warn};

use crate::transport::ConnectionHandler;

use super::{DISPATCH_TARGET, DispatchSender};

/// Receive-side limits applied to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConnectionSettings {
    pub(crate) framing: Framing,
    pub(crate) read_timeout: Duration,
    pub(crate) max_request_bytes: usize,
}

impl ConnectionSettings {
    pub(crate) fn from_config(config: &Config) -> Self {
        Self {
            framing: config.framing(),
            read_timeout: config.read_timeout(),
            max_request_bytes: config.max_request_bytes(),
        }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectionPhase {
    Accepted,
    Receiving,
    Dispatching,
    Sending,
    HalfClosed,
    Closed,
}

/// How a connection ended.
#[derive(Debug)]
pub(crate) enum ConnectionOutcome {
    /// A response was written and the write half shut down.
    Responded,
    /// The peer closed without sending a byte.
    ClosedWithoutRequest,
    /// Reading the request failed; nothing was written.
    ReceiveFailed(ReceiveError),
    /// Writing the response failed.
    SendFailed(std::io::Error),
}

/// Dispatches each connection's request through the queue.
pub(crate) struct DispatchConnectionHandler {
    sender: DispatchSender,
    settings: ConnectionSettings,
}

impl DispatchConnectionHandler {
    pub(crate) fn new(sender: DispatchSender, settings: ConnectionSettings) -> Self {
        Self { sender, settings }
    }

    pub(crate) fn serve(&self, stream: TcpStream) -> ConnectionOutcome {
        let mut connection = Connection::new(stream);
        connection.advance(ConnectionPhase::Receiving);
        let response = match self.receive(&mut connection.stream) {
            Ok(Ok(request)) => {
                connection.advance(ConnectionPhase::Dispatching);
                self.dispatch(request)
            }
            Ok(Err(decode_error)) => {
                debug!(
                    target: DISPATCH_TARGET,
                    peer = ?connection.peer,
                    error = %decode_error,
                    "rejecting unusable request"
                );
                Response::error(decode_error.to_request_error())
            }
            Err(ReceiveError::Closed) => {
                connection.advance(ConnectionPhase::Closed);
                return ConnectionOutcome::ClosedWithoutRequest;
            }
            Err(receive_error) => {
                connection.advance(ConnectionPhase::Closed);
                return ConnectionOutcome::ReceiveFailed(receive_error);
            }
        };

        connection.advance(ConnectionPhase::Sending);
        if let Err(error) = connection.send(&response) {
            connection.advance(ConnectionPhase::Closed);
            return ConnectionOutcome::SendFailed(error);
        }
        connection.advance(ConnectionPhase::HalfClosed);
        connection.half_close();
        connection.advance(ConnectionPhase::Closed);
        ConnectionOutcome::Responded
    }

    /// Reads one frame. The inner result carries decode failures that still
    /// deserve an answer because the frame boundary is known.
    fn receive(
        &self,
        stream: &mut TcpStream,
    ) -> Result<Result<Request, DecodeError>, ReceiveError> {
        stream
            .set_read_timeout(Some(self.settings.read_timeout))
            .map_err(|source| ReceiveError::Io { source })?;
        let decoder = FrameDecoder::new(self.settings.framing, self.settings.max_request_bytes);
        match read_frame(stream, decoder) {
            Ok(frame) => Ok(decode_request(&frame)),
            Err(ReceiveError::Decode(error @ DecodeError::TooLarge { .. })) => Ok(Err(error)),
            Err(error) => Err(error),
        }
    }

    fn dispatch(&self, request: Request) -> Response {
        let command = request.command().to_owned();
        debug!(target: DISPATCH_TARGET, command = %command, "dispatching request");
        match self.sender.submit(request) {
            Ok(response) => response,
            Err(closed) => {
                warn!(target: DISPATCH_TARGET, command = %command, "dispatch queue unavailable");
                Response::error(format!("Command processing failed: {closed}"))
            }
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: TcpStream) {
        let peer = stream.peer_addr().ok();
        match self.serve(stream) {
            ConnectionOutcome::Responded => {
                debug!(target: DISPATCH_TARGET, ?peer, "connection answered");
            }
            ConnectionOutcome::ClosedWithoutRequest => {
                debug!(target: DISPATCH_TARGET, ?peer, "peer closed without a request");
            }
            ConnectionOutcome::ReceiveFailed(error) => {
                debug!(target: DISPATCH_TARGET, ?peer, %error, "request not received");
            }
            ConnectionOutcome::SendFailed(error) => {
                warn!(target: DISPATCH_TARGET, ?peer, %error, "response not delivered");
            }
        }
    }
}

struct Connection {
    stream: TcpStream,
    peer: Option<SocketAddr>,
    phase: ConnectionPhase,
}

impl Connection {
    fn new(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self {
            stream,
            peer,
            phase: ConnectionPhase::Accepted,
        }
    }

    fn advance(&mut self, next: ConnectionPhase) {
        trace!(
            target: DISPATCH_TARGET,
            peer = ?self.peer,
            from = ?self.phase,
            to = ?next,
            "connection phase"
        );
        self.phase = next;
    }

    fn send(&mut self, response: &Response) -> std::io::Result<()> {
        let bytes = match encode_response(response) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "response could not be encoded");
                let fallback = Response::error(format!("Command processing failed: {error}"));
                encode_response(&fallback)
                    .map_err(|error| std::io::Error::new(std::io::ErrorKind::InvalidData, error))?
            }
        };
        self.stream.write_all(&bytes)?;
        self.stream.flush()
    }

    fn half_close(&self) {
        if let Err(error) = self.stream.shutdown(Shutdown::Write) {
            debug!(
                target: DISPATCH_TARGET,
                peer = ?self.peer,
                %error,
                "peer closed before the write half was shut down"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::Arc;
    use std::thread::{self, JoinHandle};

    use hostlink_protocol::{Params, decode_response};
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::dispatch::{CommandError, CommandRegistry, dispatch_queue};

    struct HandlerHarness {
        client: TcpStream,
        server: JoinHandle<ConnectionOutcome>,
    }

    impl HandlerHarness {
        fn start(settings: ConnectionSettings) -> Self {
            let registry = CommandRegistry::builder()
                .register("ping", |_: &Params| -> Result<Response, CommandError> {
                    Ok(Response::ok().with_field("reply", "pong"))
                })
                .build();
            let (sender, pump) = dispatch_queue(Arc::new(registry));
            thread::spawn(move || pump.run_until_stopped());

            let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
            let addr = listener.local_addr().expect("listener address");
            let server = thread::spawn(move || {
                let (stream, _) = listener.accept().expect("accept connection");
                DispatchConnectionHandler::new(sender, settings).serve(stream)
            });
            let client = TcpStream::connect(addr).expect("connect client");
            Self { client, server }
        }

        fn send(&mut self, bytes: &[u8]) {
            self.client.write_all(bytes).expect("write request");
        }

        fn read_response(&mut self) -> Vec<u8> {
            let mut received = Vec::new();
            self.client.read_to_end(&mut received).expect("read response");
            received
        }

        fn finish(self) -> ConnectionOutcome {
            drop(self.client);
            self.server.join().expect("join server")
        }
    }

    #[fixture]
    fn delimited() -> ConnectionSettings {
        ConnectionSettings {
            read_timeout: Duration::from_millis(500),
            ..ConnectionSettings::default()
        }
    }

    #[rstest]
    fn responds_then_half_closes(delimited: ConnectionSettings) {
        let mut harness = HandlerHarness::start(delimited);
        harness.send(b"{\"command\":\"ping\"}\n");
        let received = harness.read_response();
        assert_eq!(received.last(), Some(&b'\n'));
        let response = decode_response(&received).expect("decode");
        assert_eq!(response.get("reply"), Some(&json!("pong")));
        assert!(matches!(harness.finish(), ConnectionOutcome::Responded));
    }

    #[rstest]
    fn accepts_unterminated_request_after_half_close(delimited: ConnectionSettings) {
        let mut harness = HandlerHarness::start(delimited);
        harness.send(b"{\"command\":\"ping\"}");
        harness
            .client
            .shutdown(Shutdown::Write)
            .expect("half-close client");
        let response = decode_response(&harness.read_response()).expect("decode");
        assert!(response.is_success());
        assert!(matches!(harness.finish(), ConnectionOutcome::Responded));
    }

    #[rstest]
    #[case::malformed(b"{not json}\n".as_slice(), "Malformed request: ")]
    #[case::invalid(b"{\"params\":{}}\n".as_slice(), "Invalid request: ")]
    fn answers_unusable_frames(
        delimited: ConnectionSettings,
        #[case] frame: &[u8],
        #[case] prefix: &str,
    ) {
        let mut harness = HandlerHarness::start(delimited);
        harness.send(frame);
        let response = decode_response(&harness.read_response()).expect("decode");
        assert!(!response.is_success());
        let message = response.error_message().expect("error message");
        assert!(message.starts_with(prefix), "unexpected message: {message}");
        assert!(matches!(harness.finish(), ConnectionOutcome::Responded));
    }

    #[rstest]
    fn truncated_request_gets_no_response(delimited: ConnectionSettings) {
        let mut harness = HandlerHarness::start(delimited);
        harness.send(b"{\"command\":\"pi");
        harness
            .client
            .shutdown(Shutdown::Write)
            .expect("half-close client");
        assert!(harness.read_response().is_empty());
        assert!(matches!(
            harness.finish(),
            ConnectionOutcome::ReceiveFailed(ReceiveError::Decode(DecodeError::IncompleteMessage))
        ));
    }

    #[rstest]
    fn silent_peer_times_out(delimited: ConnectionSettings) {
        let settings = ConnectionSettings {
            read_timeout: Duration::from_millis(50),
            ..delimited
        };
        let mut harness = HandlerHarness::start(settings);
        harness.send(b"{\"command\":");
        assert!(harness.read_response().is_empty());
        assert!(matches!(
            harness.finish(),
            ConnectionOutcome::ReceiveFailed(ReceiveError::Timeout)
        ));
    }

    #[rstest]
    fn speculative_framing_answers_without_terminator(delimited: ConnectionSettings) {
        let settings = ConnectionSettings {
            framing: Framing::Speculative,
            ..delimited
        };
        let mut harness = HandlerHarness::start(settings);
        // The client keeps its write half open; only the parse completes the frame.
        harness.send(b"{\"command\":\"ping\"}");
        let response = decode_response(&harness.read_response()).expect("decode");
        assert!(response.is_success());
        assert!(matches!(harness.finish(), ConnectionOutcome::Responded));
    }

    #[rstest]
    fn delimited_framing_waits_for_terminator(delimited: ConnectionSettings) {
        let settings = ConnectionSettings {
            read_timeout: Duration::from_millis(100),
            ..delimited
        };
        let mut harness = HandlerHarness::start(settings);
        harness.send(b"{\"command\":\"ping\"}");
        // Without a newline or half-close the server waits until it times out.
        assert!(harness.read_response().is_empty());
        assert!(matches!(
            harness.finish(),
            ConnectionOutcome::ReceiveFailed(ReceiveError::Timeout)
        ));
    }

    #[rstest]
    fn oversized_request_is_rejected(delimited: ConnectionSettings) {
        let settings = ConnectionSettings {
            max_request_bytes: 16,
            ..delimited
        };
        let mut harness = HandlerHarness::start(settings);
        harness.send(b"{\"command\":\"ping\",\"params\":{\"padding\":\"xxxxxxxx\"}}\n");
        let response = decode_response(&harness.read_response()).expect("decode");
        let message = response.error_message().expect("error message");
        assert!(message.contains("exceeds the 16 byte limit"), "{message}");
        harness.finish();
    }

    #[rstest]
    fn stopped_queue_is_reported(delimited: ConnectionSettings) {
        let (sender, pump) = dispatch_queue(Arc::new(CommandRegistry::default()));
        drop(pump);
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
        let addr = listener.local_addr().expect("listener address");
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept connection");
            DispatchConnectionHandler::new(sender, delimited).serve(stream)
        });
        let mut client = TcpStream::connect(addr).expect("connect client");
        client
            .write_all(b"{\"command\":\"health_check\"}\n")
            .expect("write");
        let mut received = Vec::new();
        client.read_to_end(&mut received).expect("read");
        let response = decode_response(&received).expect("decode");
        assert_eq!(
            response.error_message(),
            Some("Command processing failed: dispatch queue unavailable")
        );
        assert!(matches!(
            server.join().expect("join"),
            ConnectionOutcome::Responded
        ));
    }
}
