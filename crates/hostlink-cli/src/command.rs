//! Conversion of parsed subcommands into work for the client.

use std::fs;
use std::time::Duration;

use hostlink_protocol::{Params, Request};
use serde_json::Value;

use crate::cli::{CliCommand, ExecArgs, RenderArgs};
use crate::client::RenderOptions;
use crate::errors::AppError;

/// What one CLI invocation asks the client to do.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Invocation {
    /// Send one request and print the response.
    Request(Request),
    /// Call `health_check` repeatedly.
    Probe { count: u32, interval: Duration },
}

impl TryFrom<CliCommand> for Invocation {
    type Error = AppError;

    fn try_from(command: CliCommand) -> Result<Self, Self::Error> {
        let request = match command {
            CliCommand::Health => Request::new("health_check"),
            CliCommand::Scene => Request::new("get_scene_info"),
            CliCommand::Cameras => Request::new("list_cameras"),
            CliCommand::Exec(args) => exec_request(args)?,
            CliCommand::Render(args) => render_request(args),
            CliCommand::Call { command, params } => {
                Request::with_params(command, parse_params(params.as_deref())?)
            }
            CliCommand::Probe { count, interval_ms } => {
                return Ok(Self::Probe {
                    count,
                    interval: Duration::from_millis(interval_ms),
                });
            }
        };
        Ok(Self::Request(request))
    }
}

fn exec_request(args: ExecArgs) -> Result<Request, AppError> {
    let code = match (args.code, args.file) {
        (Some(code), _) => code,
        (None, Some(path)) => {
            fs::read_to_string(&path).map_err(|source| AppError::ReadCode { path, source })?
        }
        (None, None) => String::new(),
    };
    let mut params = Params::new();
    params.insert(String::from("code"), Value::String(code));
    Ok(Request::with_params("execute_code", params))
}

fn render_request(args: RenderArgs) -> Request {
    let options = RenderOptions {
        camera: args.camera,
        width: args.width,
        height: args.height,
        format: args.format,
        quality: args.quality,
    };
    Request::with_params("render_camera", options.to_params())
}

fn parse_params(raw: Option<&str>) -> Result<Params, AppError> {
    let Some(raw) = raw else {
        return Ok(Params::new());
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(params)) => Ok(params),
        Ok(other) => Err(AppError::InvalidParams {
            reason: format!("got {}", json_type(&other)),
        }),
        Err(error) => Err(AppError::InvalidParams {
            reason: error.to_string(),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
