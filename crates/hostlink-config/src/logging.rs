//! Output format for the diagnostics `hostlinkd` writes to stderr.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Shape of each log record emitted by the host server.
///
/// Accepted spellings are `json` and `compact`, in any case, from the
/// config file, `HOSTLINK_LOG_FORMAT` or `--log-format`.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per record, for a host that captures stderr.
    #[default]
    Json,
    /// Terse text for a developer watching the host's console.
    Compact,
}

impl LogFormat {
    /// Whether records are machine-readable objects.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Returned when a `--log-format` value names no known format.
pub type LogFormatParseError = strum::ParseError;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::lower("compact", LogFormat::Compact)]
    #[case::upper("JSON", LogFormat::Json)]
    fn accepts_any_case(#[case] text: &str, #[case] expected: LogFormat) {
        assert_eq!(text.parse::<LogFormat>().ok(), Some(expected));
    }

    #[rstest]
    fn rejects_unknown_formats() {
        assert!("pretty".parse::<LogFormat>().is_err());
    }

    #[rstest]
    fn only_json_is_structured() {
        assert!(LogFormat::Json.is_structured());
        assert!(!LogFormat::Compact.is_structured());
        assert_eq!(LogFormat::default().to_string(), "json");
    }
}
