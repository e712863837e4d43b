//! Frame encoding and decoding.
//!
//! Encoders always emit compact JSON followed by [`FRAME_TERMINATOR`]. The
//! decoder is incremental: bytes are pushed as they arrive and a frame is
//! yielded once the active [`Framing`] mode considers it complete.

use std::io::{self, Read};

use hostlink_config::Framing;
use serde::Serialize;
use serde::de::IgnoredAny;
use serde_json::Value;

use crate::errors::{DecodeError, EncodeError, ReceiveError};
use crate::message::{Request, Response};

/// Byte that ends every encoded frame.
pub const FRAME_TERMINATOR: u8 = b'\n';

const READ_CHUNK: usize = 4096;

/// Encodes a request as one newline-terminated frame.
///
/// # Errors
///
/// Returns an [`EncodeError`] if serialisation fails.
pub fn encode_request(request: &Request) -> Result<Vec<u8>, EncodeError> {
    encode(request)
}

/// Encodes a response as one newline-terminated frame.
///
/// # Errors
///
/// Returns an [`EncodeError`] if serialisation fails.
pub fn encode_response(response: &Response) -> Result<Vec<u8>, EncodeError> {
    encode(response)
}

fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = serde_json::to_vec(message)?;
    bytes.push(FRAME_TERMINATOR);
    Ok(bytes)
}

/// Decodes a request frame.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidUtf8`] or [`DecodeError::Malformed`] when the
/// frame is not a JSON document, and [`DecodeError::Invalid`] when the
/// document is not a request.
pub fn decode_request(frame: &[u8]) -> Result<Request, DecodeError> {
    decode_document(frame).and_then(Request::from_value)
}

/// Decodes a response frame.
///
/// # Errors
///
/// Fails like [`decode_request`], and when `success` is missing or not a
/// boolean.
pub fn decode_response(frame: &[u8]) -> Result<Response, DecodeError> {
    decode_document(frame).and_then(Response::from_value)
}

fn decode_document(frame: &[u8]) -> Result<Value, DecodeError> {
    let trimmed = frame.trim_ascii();
    if trimmed.is_empty() {
        return Err(DecodeError::empty());
    }
    let text = std::str::from_utf8(trimmed).map_err(|source| DecodeError::InvalidUtf8 { source })?;
    serde_json::from_str(text).map_err(DecodeError::malformed)
}

fn parses_as_json(bytes: &[u8]) -> bool {
    let trimmed = bytes.trim_ascii();
    !trimmed.is_empty() && serde_json::from_slice::<IgnoredAny>(trimmed).is_ok()
}

/// Incremental frame decoder.
#[derive(Debug)]
pub struct FrameDecoder {
    framing: Framing,
    limit: usize,
    buffer: Vec<u8>,
    scanned: usize,
}

impl FrameDecoder {
    /// Builds a decoder that accepts frames of at most `limit` bytes.
    #[must_use]
    pub fn new(framing: Framing, limit: usize) -> Self {
        Self {
            framing,
            limit,
            buffer: Vec::new(),
            scanned: 0,
        }
    }

    /// Bytes buffered so far.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Appends `chunk` and returns the frame once it is complete.
    ///
    /// Bytes after the end of the first frame are discarded because a
    /// connection carries a single message.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TooLarge`] once the frame outgrows the limit.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Option<Vec<u8>>, DecodeError> {
        self.buffer.extend_from_slice(chunk);
        match self.framing {
            Framing::Delimited => self.take_delimited(),
            Framing::Speculative => self.take_speculative(),
        }
    }

    /// Resolves the buffer once the peer has closed its write half.
    ///
    /// A delimited peer may omit the terminator, so the buffer is accepted if
    /// it parses as one JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::IncompleteMessage`] when the buffer does not
    /// hold a complete document.
    pub fn finish(self) -> Result<Vec<u8>, DecodeError> {
        if parses_as_json(&self.buffer) {
            Ok(self.buffer)
        } else {
            Err(DecodeError::IncompleteMessage)
        }
    }

    fn take_delimited(&mut self) -> Result<Option<Vec<u8>>, DecodeError> {
        let unscanned = self.buffer.get(self.scanned..).unwrap_or_default();
        let Some(offset) = unscanned.iter().position(|byte| *byte == FRAME_TERMINATOR) else {
            self.scanned = self.buffer.len();
            self.check_limit(self.buffer.len())?;
            return Ok(None);
        };
        let end = self.scanned + offset;
        self.check_limit(end)?;
        self.buffer.truncate(end);
        Ok(Some(std::mem::take(&mut self.buffer)))
    }

    fn take_speculative(&mut self) -> Result<Option<Vec<u8>>, DecodeError> {
        self.check_limit(self.buffer.len())?;
        if parses_as_json(&self.buffer) {
            Ok(Some(std::mem::take(&mut self.buffer)))
        } else {
            Ok(None)
        }
    }

    fn check_limit(&self, size: usize) -> Result<(), DecodeError> {
        if size > self.limit {
            Err(DecodeError::TooLarge {
                size,
                limit: self.limit,
            })
        } else {
            Ok(())
        }
    }
}

/// Reads from `reader` until `decoder` yields a frame or the stream ends.
///
/// Timeouts configured on the underlying stream surface as
/// [`ReceiveError::Timeout`].
///
/// # Errors
///
/// Returns [`ReceiveError::Closed`] when the stream ends without any bytes and
/// [`ReceiveError::Decode`] when it ends inside an incomplete frame.
pub fn read_frame<R: Read>(
    reader: &mut R,
    mut decoder: FrameDecoder,
) -> Result<Vec<u8>, ReceiveError> {
    let mut chunk = [0_u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) if decoder.buffered() == 0 => return Err(ReceiveError::Closed),
            Ok(0) => return decoder.finish().map_err(ReceiveError::from),
            Ok(read) => {
                let received = chunk.get(..read).unwrap_or_default();
                if let Some(frame) = decoder.push(received)? {
                    return Ok(frame);
                }
            }
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                return Err(ReceiveError::Timeout);
            }
            Err(source) => return Err(ReceiveError::Io { source }),
        }
    }
}
