use std::sync::Arc;

use hostlink_protocol::{Params, Response};
use time::OffsetDateTime;

use crate::dispatch::{CommandError, CommandHandler};
use crate::host::HostApplication;

/// `health_check`: reports that the server is alive.
pub struct HealthCheck {
    host: Arc<dyn HostApplication>,
}

impl HealthCheck {
    #[must_use]
    pub fn new(host: Arc<dyn HostApplication>) -> Self {
        Self { host }
    }
}

impl CommandHandler for HealthCheck {
    fn handle(&self, _params: &Params) -> Result<Response, CommandError> {
        Ok(Response::ok()
            .with_field("status", "healthy")
            .with_field("version", self.host.version().version)
            .with_field("server_version", env!("CARGO_PKG_VERSION"))
            .with_field("timestamp", unix_seconds(OffsetDateTime::now_utc())))
    }
}

fn unix_seconds(now: OffsetDateTime) -> f64 {
    now.unix_timestamp_nanos() as f64 / 1_000_000_000.0
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::commands::test_support::{MockHost, host_version};

    #[rstest]
    fn reports_host_and_server_versions() {
        let mut host = MockHost::new();
        host.expect_version().times(1).returning(host_version);
        let before = unix_seconds(OffsetDateTime::now_utc());

        let response = HealthCheck::new(Arc::new(host))
            .handle(&Params::new())
            .expect("health check");

        assert!(response.is_success());
        assert_eq!(response.get("status"), Some(&json!("healthy")));
        assert_eq!(response.get("version"), Some(&json!("4.1.0")));
        assert_eq!(
            response.get("server_version"),
            Some(&json!(env!("CARGO_PKG_VERSION")))
        );
        let timestamp = response
            .get("timestamp")
            .and_then(serde_json::Value::as_f64)
            .expect("timestamp");
        assert!(timestamp >= before.floor());
    }
}
