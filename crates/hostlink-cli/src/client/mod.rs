//! Client for the host server.
//!
//! Every call opens a fresh connection, writes one request, reads one
//! response and closes. Transport failures are retried according to a
//! [`RetryPolicy`] with a fixed delay between attempts, and whatever is left
//! once the attempts run out is folded into a failure [`Response`].

mod errors;
mod retry;
mod session;

use std::time::Duration;

use hostlink_config::{Config, ServerEndpoint};
use hostlink_protocol::{Params, Request, Response};
use serde_json::Value;
use tracing::debug;

pub use self::errors::{TRANSPORT_ERROR_FIELD, TransportError, TransportErrorKind};
pub use self::retry::RetryPolicy;
use self::retry::{RetrySchedule, run_with_retry};
use self::session::{RequestSession, SessionTimeouts};

pub(crate) const CLIENT_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::client");

/// Command names whose responses may take as long as a render.
const RENDER_COMMANDS: &[&str] = &["render_camera"];

/// Optional arguments of `render_camera`; unset fields use server defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub camera: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub quality: Option<u8>,
}

impl RenderOptions {
    /// Request parameters for the set fields.
    #[must_use]
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        if let Some(camera) = &self.camera {
            params.insert(String::from("camera"), Value::from(camera.as_str()));
        }
        if let Some(width) = self.width {
            params.insert(String::from("width"), Value::from(width));
        }
        if let Some(height) = self.height {
            params.insert(String::from("height"), Value::from(height));
        }
        if let Some(format) = &self.format {
            params.insert(String::from("format"), Value::from(format.as_str()));
        }
        if let Some(quality) = self.quality {
            params.insert(String::from("quality"), Value::from(quality));
        }
        params
    }
}

/// Connection settings for a [`Client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: ServerEndpoint,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub render_timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl ClientSettings {
    /// Extracts client-facing settings from the shared configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.endpoint(),
            connect_timeout: config.connect_timeout(),
            command_timeout: config.command_timeout(),
            render_timeout: config.render_timeout(),
            max_attempts: config.max_attempts(),
            retry_delay: config.retry_delay(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Handle used to call commands on a host server.
///
/// Clients hold no connection between calls, so one value can be cloned or
/// shared across threads freely.
#[derive(Debug, Clone)]
pub struct Client {
    settings: ClientSettings,
    policy: RetryPolicy,
}

impl Client {
    /// Client configured from `config` with the default retry policy.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_settings(ClientSettings::from_config(config))
    }

    /// Client using explicit settings.
    #[must_use]
    pub fn with_settings(settings: ClientSettings) -> Self {
        Self {
            settings,
            policy: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Settings in use.
    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Response deadline applied to `command`.
    #[must_use]
    pub fn timeout_for(&self, command: &str) -> Duration {
        if RENDER_COMMANDS.contains(&command) {
            self.settings.render_timeout
        } else {
            self.settings.command_timeout
        }
    }

    /// Calls `command`, folding transport failures into a failure response.
    #[must_use]
    pub fn call(&self, command: &str, params: Params) -> Response {
        self.send(&Request::with_params(command, params))
    }

    /// Calls `command`, returning transport failures as typed errors.
    ///
    /// # Errors
    ///
    /// See [`try_send`](Self::try_send).
    pub fn try_call(&self, command: &str, params: Params) -> Result<Response, TransportError> {
        self.try_send(&Request::with_params(command, params))
    }

    /// Sends a prepared request, folding transport failures into a failure
    /// response.
    #[must_use]
    pub fn send(&self, request: &Request) -> Response {
        self.try_send(request)
            .unwrap_or_else(|error| error.to_response())
    }

    /// Sends a prepared request.
    ///
    /// # Errors
    ///
    /// Returns the [`TransportError`] left once retries are exhausted or a
    /// non-retryable failure occurs. Failure responses from the server are
    /// `Ok` values.
    pub fn try_send(&self, request: &Request) -> Result<Response, TransportError> {
        let timeouts = SessionTimeouts {
            connect: self.settings.connect_timeout,
            response: self.timeout_for(request.command()),
        };
        let schedule = RetrySchedule {
            max_attempts: self.settings.max_attempts,
            delay: self.settings.retry_delay,
        };
        let session = RequestSession::new(&self.settings.endpoint, timeouts);
        run_with_retry(self.policy, schedule, request.command(), |attempt| {
            debug!(
                target: CLIENT_TARGET,
                command = request.command(),
                attempt,
                endpoint = %self.settings.endpoint,
                "sending request"
            );
            session.run(request)
        })
    }

    /// Calls `health_check`.
    #[must_use]
    pub fn health_check(&self) -> Response {
        self.call("health_check", Params::new())
    }

    /// Calls `get_scene_info`.
    #[must_use]
    pub fn scene_info(&self) -> Response {
        self.call("get_scene_info", Params::new())
    }

    /// Calls `list_cameras`.
    #[must_use]
    pub fn list_cameras(&self) -> Response {
        self.call("list_cameras", Params::new())
    }

    /// Calls `execute_code` with `code`.
    #[must_use]
    pub fn execute_code(&self, code: &str) -> Response {
        let mut params = Params::new();
        params.insert(String::from("code"), Value::from(code));
        self.call("execute_code", params)
    }

    /// Calls `render_camera`.
    #[must_use]
    pub fn render_camera(&self, options: &RenderOptions) -> Response {
        self.call("render_camera", options.to_params())
    }
}
