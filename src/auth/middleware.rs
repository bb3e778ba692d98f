// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization middleware for Axum.
//!
//! Protected routes are wrapped with
//! `axum::middleware::from_fn_with_state(PipelineState::new(..), enforce)`.
//! The pipeline runs in a fixed order and stops at the first failure:
//!
//! 1. bearer header present
//! 2. token verifies (signature, expiry, audience)
//! 3. subject resolves to an account
//! 4. trusted-service key matches (server-to-server routes only)
//!
//! On success the [`AuthenticatedAccount`] is inserted into the request's
//! extensions, where the handler reads it through the `Auth` extractor.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use super::claims::{AuthenticatedAccount, TrustedCaller};
use super::resolver::IdentityResolver;
use super::trusted::TrustedServiceGate;
use super::verifier::{bearer_token, TokenVerifier};
use super::AuthError;
use crate::state::AppState;

/// Which checks guard a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPipeline {
    /// Token then account
    Identity,
    /// Token, account, then trusted-service key
    IdentityAndTrusted,
}

impl AuthPipeline {
    pub fn requires_trusted_caller(&self) -> bool {
        matches!(self, AuthPipeline::IdentityAndTrusted)
    }
}

/// Middleware state: the app context plus the pipeline to run.
#[derive(Clone)]
pub struct PipelineState {
    pub state: AppState,
    pub pipeline: AuthPipeline,
}

impl PipelineState {
    pub fn new(state: AppState, pipeline: AuthPipeline) -> Self {
        Self { state, pipeline }
    }
}

/// Run `pipeline` against the request headers.
pub fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    pipeline: AuthPipeline,
) -> Result<AuthenticatedAccount, AuthError> {
    let config = &state.auth_config;

    let token = bearer_token(headers)?;
    let subject = TokenVerifier::new(config.jwt_secret.as_ref(), &config.audience).verify(token)?;
    let account = IdentityResolver::new(&state.store).resolve(&subject)?;

    if pipeline.requires_trusted_caller() {
        TrustedServiceGate::new(config.trusted_service_key.as_ref()).check(headers)?;
    }

    Ok(account)
}

/// Authorization middleware function.
pub async fn enforce(
    State(gate): State<PipelineState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let account = authorize(&gate.state, request.headers(), gate.pipeline)?;

    tracing::debug!(account_id = account.account_id, pipeline = ?gate.pipeline, "Request authorized");

    request.extensions_mut().insert(account);
    if gate.pipeline.requires_trusted_caller() {
        request.extensions_mut().insert(TrustedCaller);
    }
    Ok(next.run(request).await)
}
