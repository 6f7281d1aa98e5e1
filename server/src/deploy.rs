// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Deployment triggered by an accepted webhook.
//!
//! The receiver answers `202 Accepted` before the deployment starts. No
//! ordering is imposed between deployments triggered close together.

use crate::error::StartupError;
use dchook_common::ClientIdentity;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info};

/// Who asked for a deployment, and from which build.
#[derive(Debug, Clone)]
pub struct DeployTrigger {
    pub identity: ClientIdentity,
    pub version: String,
    pub commit: String,
}

/// Something that can run a deployment.
pub trait Deployer: Send + Sync {
    /// Start a deployment. Must return without waiting for it to finish.
    fn trigger(&self, trigger: DeployTrigger);
}

/// Errors from a single deployment run.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("{step} failed to start: {source}")]
    Spawn {
        step: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} failed: {status}")]
    Failed { step: &'static str, status: ExitStatus },
}

/// Pulls images and recreates services with `docker compose`.
#[derive(Debug, Clone)]
pub struct ComposeDeployer {
    compose_file: PathBuf,
}

impl ComposeDeployer {
    pub fn new(compose_file: impl Into<PathBuf>) -> Self {
        Self {
            compose_file: compose_file.into(),
        }
    }

    /// Check that the compose file exists and docker answers.
    pub async fn preflight(&self) -> Result<(), StartupError> {
        if tokio::fs::metadata(&self.compose_file).await.is_err() {
            return Err(StartupError::ComposeFileMissing(self.compose_file.clone()));
        }

        let status = Command::new("docker")
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| StartupError::DockerUnavailable(e.to_string()))?;
        if !status.success() {
            return Err(StartupError::DockerUnavailable(status.to_string()));
        }
        Ok(())
    }

    /// Run `pull` then `up -d --remove-orphans`, streaming output to ours.
    pub async fn deploy(&self) -> Result<(), DeployError> {
        info!(compose_file = %self.compose_file.display(), "Starting deployment");
        self.compose("pull", &["pull"]).await?;
        self.compose("up", &["up", "-d", "--remove-orphans"]).await?;
        info!("Deployment complete");
        Ok(())
    }

    async fn compose(&self, step: &'static str, args: &[&str]) -> Result<(), DeployError> {
        let status = Command::new("docker")
            .arg("compose")
            .arg("-f")
            .arg(&self.compose_file)
            .args(args)
            .status()
            .await
            .map_err(|source| DeployError::Spawn { step, source })?;

        if status.success() {
            Ok(())
        } else {
            Err(DeployError::Failed { step, status })
        }
    }
}

impl Deployer for ComposeDeployer {
    fn trigger(&self, trigger: DeployTrigger) {
        let deployer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = deployer.deploy().await {
                error!(
                    identity = %trigger.identity,
                    client_version = %trigger.version,
                    error = %e,
                    "Deployment failed"
                );
            }
        });
    }
}
