use std::ops::RangeInclusive;

use hostlink_protocol::Params;
use serde_json::Value;

use crate::dispatch::CommandError;

pub(super) fn required_str<'p>(params: &'p Params, name: &str) -> Result<&'p str, CommandError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| CommandError::invalid_parameter(name, "expected a string"))
}

pub(super) fn optional_str<'p>(
    params: &'p Params,
    name: &str,
    default: &'p str,
) -> Result<&'p str, CommandError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(CommandError::invalid_parameter(name, "expected a string")),
    }
}

pub(super) fn optional_int_in(
    params: &Params,
    name: &str,
    default: u32,
    range: RangeInclusive<u32>,
) -> Result<u32, CommandError> {
    let value = match params.get(name) {
        None | Some(Value::Null) => return Ok(default),
        Some(value) => value,
    };
    value
        .as_u64()
        .and_then(|raw| u32::try_from(raw).ok())
        .filter(|raw| range.contains(raw))
        .ok_or_else(|| {
            CommandError::invalid_parameter(
                name,
                format!(
                    "expected an integer in {}..={}",
                    range.start(),
                    range.end()
                ),
            )
        })
}
