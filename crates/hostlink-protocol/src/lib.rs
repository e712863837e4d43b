//! Wire model and codec shared by the hostlink server and client.
//!
//! A connection carries exactly one [`Request`] followed by one [`Response`].
//! Both are encoded as compact JSON terminated by a single newline; the
//! [`FrameDecoder`] finds the end of a frame according to the configured
//! [`Framing`] mode.

mod codec;
mod errors;
mod message;

pub use codec::{
    FRAME_TERMINATOR, FrameDecoder, decode_request, decode_response, encode_request,
    encode_response, read_frame,
};
pub use errors::{DecodeError, EncodeError, ReceiveError};
pub use hostlink_config::Framing;
pub use message::{MISSING_ERROR_MESSAGE, Params, Request, Response};
