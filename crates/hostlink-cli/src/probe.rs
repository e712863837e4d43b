//! Repeated `health_check` calls with per-call latency.

use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::client::Client;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ProbeSample {
    pub(crate) call: u32,
    pub(crate) success: bool,
    pub(crate) latency_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ProbeReport {
    pub(crate) success: bool,
    pub(crate) count: u32,
    pub(crate) succeeded: u32,
    pub(crate) samples: Vec<ProbeSample>,
}

pub(crate) fn probe(client: &Client, count: u32, interval: Duration) -> ProbeReport {
    let mut samples = Vec::new();
    for call in 1..=count {
        if call > 1 {
            thread::sleep(interval);
        }
        let started = Instant::now();
        let response = client.health_check();
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        samples.push(ProbeSample {
            call,
            success: response.is_success(),
            latency_ms,
            error: response.error_message().map(str::to_owned),
        });
    }
    let succeeded = samples.iter().filter(|sample| sample.success).count();
    let succeeded = u32::try_from(succeeded).unwrap_or(u32::MAX);
    ProbeReport {
        success: succeeded == count,
        count,
        succeeded,
        samples,
    }
}
