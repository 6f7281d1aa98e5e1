// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the webhook receiver.

use crate::client_ip::resolve_identity;
use crate::metrics::{Metrics, ACCEPTED};
use crate::pipeline::Pipeline;
use axum::{
    body::{self, Body},
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dchook_common::{MAX_REQUEST_BODY_SIZE, SIGNATURE_HEADER};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared application state.
pub struct AppState {
    pub pipeline: Pipeline,
    /// `None` when the metrics endpoint is disabled
    pub metrics: Option<Metrics>,
    pub enable_version_endpoint: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Version endpoint response.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub supported_algorithms: Vec<&'static str>,
}

/// Build the router for the given state.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/deploy", post(deploy))
        .route("/health", get(health));

    if state.enable_version_endpoint {
        app = app.route("/version", get(version));
    }
    if state.metrics.is_some() {
        app = app.route("/metrics", get(metrics));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Trigger a deployment.
///
/// The body is read inside the pipeline so that banned callers are refused
/// before any of it is consumed.
pub async fn deploy(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    request_body: Body,
) -> Response {
    let identity = resolve_identity(peer, &headers);
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let read_body = async move {
        body::to_bytes(request_body, MAX_REQUEST_BODY_SIZE)
            .await
            .map(|bytes| bytes.to_vec())
    };

    let result = state.pipeline.process(&identity, signature, read_body).await;

    if let Some(metrics) = &state.metrics {
        match &result {
            Ok(_) => metrics.observe(ACCEPTED),
            Err(rejection) => metrics.observe(rejection.code()),
        }
    }

    match result {
        Ok(_) => (StatusCode::ACCEPTED, "Deployment triggered\n").into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "dchook",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build and algorithm information.
pub async fn version(State(state): State<Arc<AppState>>) -> Json<VersionResponse> {
    let build = state.pipeline.build();
    Json(VersionResponse {
        version: build.version,
        commit: build.commit,
        supported_algorithms: state.pipeline.allowed_algorithms().names(),
    })
}

/// Prometheus metrics in text format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let Some(metrics) = &state.metrics else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match metrics.render() {
        Ok(text) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
