//! Frame decoder selection shared by the server and its tests.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the server finds the end of a request on the byte stream.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Framing {
    /// A frame ends at the first newline, or at end of stream.
    #[default]
    Delimited,
    /// The buffer is re-parsed after every chunk and the first complete JSON
    /// document wins. Only for peers that never send a terminator; a prefix
    /// that is itself valid JSON (such as a bare number) is decoded early.
    Speculative,
}

/// Errors encountered while parsing a [`Framing`] from text.
pub type FramingParseError = strum::ParseError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Speculative".parse::<Framing>().ok(), Some(Framing::Speculative));
        assert_eq!("delimited".parse::<Framing>().ok(), Some(Framing::Delimited));
        assert!("length_prefixed".parse::<Framing>().is_err());
    }
}
