// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failures raised by the authorization pipeline.
///
/// Every variant is terminal: once one is produced no later pipeline stage
/// and no handler body runs.
#[derive(Debug)]
pub enum AuthError {
    /// No `Authorization: Bearer <token>` header
    MissingCredential,
    /// Bad signature, wrong audience, or undecodable token
    InvalidCredential(String),
    /// Token expiry is in the past
    ExpiredCredential,
    /// Token is valid but no account is bound to its subject
    UnknownAccount,
    /// A required secret is not configured; never says which
    ServerMisconfigured,
    /// Trusted-service key missing or wrong
    ForbiddenCaller,
    /// Store failure while resolving the caller
    Internal,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::InvalidCredential(_) => "invalid_credential",
            AuthError::ExpiredCredential => "expired_credential",
            AuthError::UnknownAccount => "unknown_account",
            AuthError::ServerMisconfigured => "server_misconfigured",
            AuthError::ForbiddenCaller => "forbidden_caller",
            AuthError::Internal => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential
            | AuthError::InvalidCredential(_)
            | AuthError::ExpiredCredential => StatusCode::UNAUTHORIZED,
            AuthError::UnknownAccount => StatusCode::NOT_FOUND,
            AuthError::ForbiddenCaller => StatusCode::FORBIDDEN,
            AuthError::ServerMisconfigured | AuthError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredential => {
                write!(f, "Unauthorized: Missing or malformed Authorization header.")
            }
            AuthError::InvalidCredential(reason) => {
                write!(f, "Authentication failed: Invalid token ({reason}).")
            }
            AuthError::ExpiredCredential => write!(f, "Authentication failed: Token has expired."),
            AuthError::UnknownAccount => write!(
                f,
                "User token validated, but internal user record not found. Please sync."
            ),
            AuthError::ServerMisconfigured => write!(f, "Server configuration error."),
            AuthError::ForbiddenCaller => write!(
                f,
                "Forbidden: Invalid or missing API Key for trusted service."
            ),
            AuthError::Internal => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
