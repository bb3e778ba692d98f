// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification (HS256).

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};

use super::claims::{TokenClaims, VerifiedSubject};
use super::AuthError;
use crate::config::JWT_SECRET_ENV;

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MissingCredential)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::MissingCredential)?;

    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

/// Verifies user tokens against the shared signing secret.
pub struct TokenVerifier<'a> {
    secret: Option<&'a SecretString>,
    audience: &'a str,
}

impl<'a> TokenVerifier<'a> {
    pub fn new(secret: Option<&'a SecretString>, audience: &'a str) -> Self {
        Self { secret, audience }
    }

    /// Verify signature, expiry and audience; return the subject.
    ///
    /// No clock-skew leeway is applied. Signature is checked before expiry,
    /// so a forged token is `InvalidCredential` even when also expired.
    /// Expiry is checked before audience.
    pub fn verify(&self, token: &str) -> Result<VerifiedSubject, AuthError> {
        let Some(secret) = self.secret else {
            tracing::error!("{JWT_SECRET_ENV} is not configured; rejecting request");
            return Err(AuthError::ServerMisconfigured);
        };

        // `exp` may be fractional or negative, which jsonwebtoken's own
        // check rejects as malformed; both claims are checked below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["sub"]);

        let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
        let claims = decode::<TokenClaims>(token, &key, &validation)
            .map_err(|e| AuthError::InvalidCredential(e.to_string()))?
            .claims;

        if claims.is_expired_at(chrono::Utc::now().timestamp()) {
            return Err(AuthError::ExpiredCredential);
        }
        if !claims.has_audience(self.audience) {
            return Err(AuthError::InvalidCredential("invalid audience".to_string()));
        }

        let subject = claims.sub;
        if subject.trim().is_empty() {
            return Err(AuthError::InvalidCredential("empty subject".to_string()));
        }
        Ok(VerifiedSubject(subject))
    }
}
