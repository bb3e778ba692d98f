// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Readiness response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall status ("ok" or "degraded").
    pub status: String,
    pub checks: HealthChecks,
}

/// Individual readiness check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Whether the database answers a read transaction.
    pub database: String,
    /// Whether the token signing secret is configured.
    pub jwt_secret: String,
    /// Whether the trusted-service key is configured.
    pub trusted_service_key: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn label(ok: bool, failure: &str) -> String {
    let value = if ok { "ok" } else { failure };
    value.to_string()
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 503 if the store is unreadable or a secret is missing.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let database_ok = match state.store.check_readable() {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Readiness check: database unreadable");
            false
        }
    };
    let jwt_ok = state.auth_config.jwt_secret.is_some();
    let key_ok = state.auth_config.trusted_service_key.is_some();
    let all_ok = database_ok && jwt_ok && key_ok;

    let response = ReadyResponse {
        status: label(all_ok, "degraded"),
        checks: HealthChecks {
            service: "ok".to_string(),
            database: label(database_ok, "unavailable"),
            jwt_secret: label(jwt_ok, "missing"),
            trusted_service_key: label(key_ok, "missing"),
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
