// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! dchook
//!
//! Secure webhook receiver for Docker Compose deployments. Configuration
//! comes from flags or `DCHOOK_*` environment variables:
//!
//! - `DCHOOK_SECRET_FILE` (required): path to the webhook secret file
//! - `DCHOOK_COMPOSE_FILE` (required): path to the docker-compose.yml to manage
//! - `DCHOOK_BIND_ADDRESS`: bind address (default: 127.0.0.1)
//! - `DCHOOK_PORT`: HTTP port (default: 7999)
//! - `DCHOOK_ALLOWED_ALGORITHMS`: allowed HMAC algorithms (default: sha256,sha384,sha512)

use clap::Parser;
use dchook::{
    config::Args,
    handlers::{router, AppState},
    metrics::Metrics,
    secret::load_secret,
    ComposeDeployer, Pipeline,
};
use dchook_common::{AbuseController, BuildInfo};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let build = BuildInfo::current();

    if args.version {
        println!("dchook v{} (commit: {})", build.version, build.commit);
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = args.into_config()?;
    let secret = load_secret(&config.secret_file)?;

    let deployer = ComposeDeployer::new(&config.compose_file);
    deployer.preflight().await?;

    let metrics = if config.metrics_enabled {
        Some(Metrics::new()?)
    } else {
        None
    };

    let pipeline = Pipeline::new(
        AbuseController::new(config.abuse.clone()),
        secret,
        config.allowed_algorithms.clone(),
        build.clone(),
        Arc::new(deployer),
    );

    let state = Arc::new(AppState {
        pipeline,
        metrics,
        enable_version_endpoint: config.enable_version_endpoint,
    });

    let app = router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        version = build.version,
        commit = build.commit,
        algorithms = ?config.allowed_algorithms.names(),
        success_limit = config.abuse.success_limit,
        fail_limit = config.abuse.fail_limit,
        ban_duration_secs = config.abuse.ban_duration_secs,
        "dchook listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
