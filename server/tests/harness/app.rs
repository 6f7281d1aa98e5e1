// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-process receiver wired to a recording deployer.

use super::generators::{SECRET, SERVER_BUILD};
use axum::{
    body::{self, Body},
    extract::connect_info::MockConnectInfo,
    http::{Request, StatusCode},
    Router,
};
use dchook::{metrics::Metrics, router, AppState, DeployTrigger, Deployer, Pipeline};
use dchook_common::{AbuseConfig, AbuseController, AlgorithmSet, SIGNATURE_HEADER};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio_test::assert_ok;
use tower::ServiceExt;

/// Deployer that only remembers what it was asked to do.
#[derive(Default)]
pub struct RecordingDeployer {
    triggers: Mutex<Vec<DeployTrigger>>,
}

impl RecordingDeployer {
    pub fn count(&self) -> usize {
        self.triggers.lock().unwrap().len()
    }

    pub fn triggers(&self) -> Vec<DeployTrigger> {
        self.triggers.lock().unwrap().clone()
    }
}

impl Deployer for RecordingDeployer {
    fn trigger(&self, trigger: DeployTrigger) {
        self.triggers.lock().unwrap().push(trigger);
    }
}

/// Receiver behind a simulated local reverse proxy.
///
/// Requests arrive from 127.0.0.1 and carry the client address in
/// `X-Forwarded-For`, so each test can pick its identity per request.
pub struct TestApp {
    pub router: Router,
    pub deployer: Arc<RecordingDeployer>,
}

impl TestApp {
    pub fn new(abuse: AbuseConfig) -> Self {
        Self::with_options(abuse, AlgorithmSet::all(), true)
    }

    pub fn with_options(abuse: AbuseConfig, allowed: AlgorithmSet, enable_extras: bool) -> Self {
        let deployer = Arc::new(RecordingDeployer::default());
        let pipeline = Pipeline::new(
            AbuseController::new(abuse),
            SECRET.to_string(),
            allowed,
            SERVER_BUILD,
            deployer.clone(),
        );
        let state = Arc::new(AppState {
            pipeline,
            metrics: if enable_extras {
                Some(Metrics::new().unwrap())
            } else {
                None
            },
            enable_version_endpoint: enable_extras,
        });
        let proxy = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 52000);
        let router = router(state).layer(MockConnectInfo(proxy));

        Self { router, deployer }
    }

    /// POST /deploy as `client`.
    pub async fn deploy(
        &self,
        client: IpAddr,
        body: Vec<u8>,
        signature: Option<&str>,
    ) -> (StatusCode, String) {
        let mut request = Request::builder()
            .method("POST")
            .uri("/deploy")
            .header("content-type", "application/json")
            .header("x-forwarded-for", client.to_string());
        if let Some(signature) = signature {
            request = request.header(SIGNATURE_HEADER, signature);
        }
        self.send(request.body(Body::from(body)).unwrap()).await
    }

    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = assert_ok!(self.router.clone().oneshot(request).await);
        let status = response.status();
        let bytes = assert_ok!(body::to_bytes(response.into_body(), usize::MAX).await);
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }
}
