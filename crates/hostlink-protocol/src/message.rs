use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::DecodeError;

/// Named arguments carried by a request.
pub type Params = Map<String, Value>;

/// Message reported when a failure response omits its `error` field.
pub const MISSING_ERROR_MESSAGE: &str = "server reported failure without an error message";

/// A command invocation sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    command: String,
    #[serde(default, deserialize_with = "params_or_empty")]
    params: Params,
}

impl Request {
    /// Builds a request without parameters.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self::with_params(command, Params::new())
    }

    /// Builds a request carrying `params`.
    #[must_use]
    pub fn with_params(command: impl Into<String>, params: Params) -> Self {
        Self {
            command: command.into(),
            params,
        }
    }

    /// Converts a decoded JSON document into a request.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Invalid`] when the document is not an object
    /// with a non-empty string `command` and an object (or absent) `params`.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        if !value.is_object() {
            return Err(DecodeError::invalid("request is not a JSON object"));
        }
        let request: Self = serde_json::from_value(value)
            .map_err(|error| DecodeError::invalid(error.to_string()))?;
        if request.command.trim().is_empty() {
            return Err(DecodeError::invalid("command must not be empty"));
        }
        Ok(request)
    }

    /// Command name.
    #[must_use]
    pub fn command(&self) -> &str {
        self.command.as_str()
    }

    /// Command parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }
}

fn params_or_empty<'de, D>(deserializer: D) -> Result<Params, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Params>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Result of a command.
///
/// Every response carries `success`. Failures carry an `error` string; all
/// other fields are command specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    success: bool,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Response {
    /// Successful response without extra fields.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            fields: Map::new(),
        }
    }

    /// Failed response carrying `message` as its `error`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            fields: Map::new(),
        }
        .with_field("error", Value::String(message.into()))
    }

    /// Adds or replaces a field. The `success` flag cannot be overwritten.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a field in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if key != "success" {
            self.fields.insert(key, value.into());
        }
    }

    /// Converts a decoded JSON document into a response.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Invalid`] when the document is not an object
    /// or lacks a boolean `success`.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let Value::Object(mut fields) = value else {
            return Err(DecodeError::invalid("response is not a JSON object"));
        };
        match fields.remove("success") {
            Some(Value::Bool(success)) => Ok(Self { success, fields }),
            Some(_) => Err(DecodeError::invalid("field 'success' is not a boolean")),
            None => Err(DecodeError::invalid("missing field 'success'")),
        }
    }

    /// Whether the command succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Error text of a failed response.
    ///
    /// Returns `None` for successful responses.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        Some(
            self.fields
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or(MISSING_ERROR_MESSAGE),
        )
    }

    /// Looks up a command-specific field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Command-specific fields, excluding `success`.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Full JSON document, including `success`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut document = Map::with_capacity(self.fields.len() + 1);
        document.insert(String::from("success"), Value::Bool(self.success));
        document.extend(self.fields.clone());
        Value::Object(document)
    }
}
