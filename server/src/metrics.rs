// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for webhook outcomes.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Outcome label for accepted requests.
pub const ACCEPTED: &str = "accepted";

/// Request and deployment counters in a private registry.
pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    deploys: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("dchook_requests_total", "Deploy webhook requests by outcome"),
            &["outcome"],
        )?;
        let deploys = IntCounter::new(
            "dchook_deploys_triggered_total",
            "Deployments handed to the deployer",
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(deploys.clone()))?;

        Ok(Self {
            registry,
            requests,
            deploys,
        })
    }

    /// Count one request with the given outcome label.
    pub fn observe(&self, outcome: &str) {
        self.requests.with_label_values(&[outcome]).inc();
        if outcome == ACCEPTED {
            self.deploys.inc();
        }
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
