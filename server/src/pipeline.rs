// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-order validation of one inbound webhook.
//!
//! Steps short-circuit on the first rejection. Failures from the signature
//! step through the compatibility step count toward a ban; a ban hit or a
//! success-rate hit never does.

use crate::deploy::{DeployTrigger, Deployer};
use crate::error::Rejection;
use dchook_common::signature::check_signature;
use dchook_common::{
    is_version_compatible, AbuseController, AlgorithmSet, BuildInfo, ClientIdentity, Envelope,
    SignatureError,
};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Request validation pipeline shared by all handlers.
pub struct Pipeline {
    abuse: AbuseController,
    secret: String,
    allowed: AlgorithmSet,
    build: BuildInfo,
    deployer: Arc<dyn Deployer>,
}

impl Pipeline {
    pub fn new(
        abuse: AbuseController,
        secret: String,
        allowed: AlgorithmSet,
        build: BuildInfo,
        deployer: Arc<dyn Deployer>,
    ) -> Self {
        Self {
            abuse,
            secret,
            allowed,
            build,
            deployer,
        }
    }

    pub fn abuse(&self) -> &AbuseController {
        &self.abuse
    }

    pub fn allowed_algorithms(&self) -> &AlgorithmSet {
        &self.allowed
    }

    pub fn build(&self) -> &BuildInfo {
        &self.build
    }

    /// Run every check for one request and trigger a deploy on acceptance.
    ///
    /// `body` is awaited only once the identity has passed the ban check, so
    /// banned callers never get their body read.
    pub async fn process<F, E>(
        &self,
        identity: &ClientIdentity,
        signature: Option<&str>,
        body: F,
    ) -> Result<Envelope, Rejection>
    where
        F: Future<Output = Result<Vec<u8>, E>>,
        E: Display,
    {
        if self.abuse.is_banned(identity).await {
            warn!(%identity, "Banned identity attempted access");
            return Err(Rejection::Banned);
        }

        match self.authenticate(identity, signature, body).await {
            Ok(envelope) => {
                info!(
                    %identity,
                    client_version = %envelope.dchook.version,
                    client_commit = %envelope.dchook.commit,
                    "Deployment triggered"
                );
                self.deployer.trigger(DeployTrigger {
                    identity: identity.clone(),
                    version: envelope.dchook.version.clone(),
                    commit: envelope.dchook.commit.clone(),
                });
                Ok(envelope)
            }
            Err(rejection) => {
                warn!(%identity, reason = %rejection, "Webhook rejected");
                if rejection.counts_as_failure() {
                    self.abuse.record_failure(identity).await;
                }
                Err(rejection)
            }
        }
    }

    async fn authenticate<F, E>(
        &self,
        identity: &ClientIdentity,
        signature: Option<&str>,
        body: F,
    ) -> Result<Envelope, Rejection>
    where
        F: Future<Output = Result<Vec<u8>, E>>,
        E: Display,
    {
        let body = body
            .await
            .map_err(|e| Rejection::BodyUnreadable(e.to_string()))?;

        let signature = signature.ok_or(SignatureError::Malformed)?;
        check_signature(&body, signature, &self.secret, &self.allowed)?;

        let envelope =
            Envelope::from_slice(&body).map_err(|e| Rejection::MalformedEnvelope(e.to_string()))?;

        let timestamp = envelope
            .timestamp_micros()
            .map_err(|_| Rejection::MalformedTimestamp(envelope.dchook.timestamp.clone()))?;

        if !self.abuse.check_replay(timestamp).await {
            return Err(Rejection::Replay(timestamp));
        }

        if !is_version_compatible(
            &envelope.dchook.version,
            self.build.version,
            &envelope.dchook.commit,
            self.build.commit,
        ) {
            return Err(Rejection::VersionIncompatible {
                client_version: envelope.dchook.version.clone(),
                client_commit: envelope.dchook.commit.clone(),
                server_version: self.build.version.to_string(),
                server_commit: self.build.commit.to_string(),
            });
        }

        if !self.abuse.record_success(identity).await {
            return Err(Rejection::RateLimited);
        }

        Ok(envelope)
    }
}
