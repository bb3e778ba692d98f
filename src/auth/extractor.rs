// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the authenticated account.
//!
//! ```rust,ignore
//! async fn update_profile(Auth(account): Auth) -> impl IntoResponse {
//!     // account.account_id is the caller
//! }
//! ```
//!
//! Both extractors prefer the account placed in the request extensions by
//! [`enforce`](super::middleware::enforce). On a route without that layer
//! they run the pipeline themselves, so a handler can never see an
//! unauthorized request.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::claims::{AuthenticatedAccount, TrustedCaller};
use super::middleware::{authorize, AuthPipeline};
use super::AuthError;
use crate::state::AppState;

/// Caller authenticated by user token.
pub struct Auth(pub AuthenticatedAccount);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(account) = parts.extensions.get::<AuthenticatedAccount>().cloned() {
            return Ok(Auth(account));
        }

        let account = authorize(state, &parts.headers, AuthPipeline::Identity)?;
        parts.extensions.insert(account.clone());
        Ok(Auth(account))
    }
}

/// Caller authenticated by user token and trusted-service key.
pub struct TrustedAuth(pub AuthenticatedAccount);

impl FromRequestParts<AppState> for TrustedAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let trusted = parts.extensions.get::<TrustedCaller>().is_some();
        if let (true, Some(account)) = (trusted, parts.extensions.get::<AuthenticatedAccount>()) {
            return Ok(TrustedAuth(account.clone()));
        }

        let account = authorize(state, &parts.headers, AuthPipeline::IdentityAndTrusted)?;
        parts.extensions.insert(account.clone());
        parts.extensions.insert(TrustedCaller);
        Ok(TrustedAuth(account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::trusted::API_KEY_HEADER;
    use crate::test_support::{bearer_for, test_state, ALICE_SUBJECT, TEST_API_KEY};
    use axum::http::Request;

    fn parts(headers: &[(&str, String)]) -> Parts {
        let mut builder = Request::builder().uri("/test");
        for (name, value) in headers {
            builder = builder.header(*name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _dir) = test_state();
        let mut parts = parts(&[]);
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }

    #[tokio::test]
    async fn auth_extractor_verifies_token() {
        let (state, _dir) = test_state();
        let mut parts = parts(&[("authorization", bearer_for(ALICE_SUBJECT))]);
        let Auth(account) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(account.handle, "alice");
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _dir) = test_state();
        let mut parts = parts(&[]);
        parts.extensions.insert(AuthenticatedAccount {
            account_id: 42,
            handle: "from-middleware".into(),
            subject: "sub-42".into(),
        });

        let Auth(account) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(account.account_id, 42);
    }

    #[tokio::test]
    async fn trusted_auth_ignores_identity_only_extension() {
        let (state, _dir) = test_state();
        let mut parts = parts(&[("authorization", bearer_for(ALICE_SUBJECT))]);
        parts.extensions.insert(AuthenticatedAccount {
            account_id: 1,
            handle: "alice".into(),
            subject: ALICE_SUBJECT.into(),
        });

        let result = TrustedAuth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::ForbiddenCaller)));
    }

    #[tokio::test]
    async fn trusted_auth_accepts_key() {
        let (state, _dir) = test_state();
        let mut parts = parts(&[
            ("authorization", bearer_for(ALICE_SUBJECT)),
            (API_KEY_HEADER, TEST_API_KEY.to_string()),
        ]);
        let TrustedAuth(account) = TrustedAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(account.account_id, 1);
    }
}
