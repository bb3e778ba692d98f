// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared-key gate for server-to-server callers.

use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use super::AuthError;
use crate::config::TRUSTED_SERVICE_API_KEY_ENV;

/// Header carrying the trusted-service key.
pub const API_KEY_HEADER: &str = "x-api-key";

pub struct TrustedServiceGate<'a> {
    expected: Option<&'a SecretString>,
}

impl<'a> TrustedServiceGate<'a> {
    pub fn new(expected: Option<&'a SecretString>) -> Self {
        Self { expected }
    }

    /// Require the presented key to equal the configured one exactly.
    ///
    /// Every rejected attempt is logged with the presented key.
    pub fn check(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let Some(expected) = self.expected else {
            tracing::error!("{TRUSTED_SERVICE_API_KEY_ENV} is not configured; rejecting request");
            return Err(AuthError::ServerMisconfigured);
        };

        let presented = headers
            .get(API_KEY_HEADER)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

        match presented.as_deref() {
            Some(key) if keys_match(key, expected.expose_secret()) => Ok(()),
            other => {
                tracing::warn!(
                    presented_key = other.unwrap_or("<none>"),
                    "Forbidden trusted-service access attempt"
                );
                Err(AuthError::ForbiddenCaller)
            }
        }
    }
}

fn keys_match(presented: &str, expected: &str) -> bool {
    !presented.is_empty() && bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}
