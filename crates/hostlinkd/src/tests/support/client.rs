//! Minimal one-shot client used to drive a running server.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use hostlink_protocol::{Params, Request, Response, decode_response, encode_request};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends `bytes`, optionally half-closing, and returns everything the server
/// wrote before closing.
pub fn send_raw(addr: SocketAddr, bytes: &[u8], half_close: bool) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).expect("connect to server");
    stream
        .set_read_timeout(Some(CLIENT_TIMEOUT))
        .expect("set read timeout");
    stream.write_all(bytes).expect("write request");
    if half_close {
        stream.shutdown(Shutdown::Write).expect("half-close");
    }
    let mut received = Vec::new();
    match stream.read_to_end(&mut received) {
        Ok(_) => received,
        Err(error) if error.kind() == std::io::ErrorKind::ConnectionReset => received,
        Err(error) => panic!("failed to read response: {error}"),
    }
}

/// Calls `command` and decodes the response.
pub fn call(addr: SocketAddr, command: &str, params: Params) -> Response {
    let request = Request::with_params(command, params);
    let bytes = encode_request(&request).expect("encode request");
    let received = send_raw(addr, &bytes, false);
    decode_response(&received).expect("decode response")
}
