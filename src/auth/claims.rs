// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the authenticated account representation.

use serde::{Deserialize, Serialize};

use crate::storage::{Account, AccountId};

/// Audience every user token must carry unless overridden by configuration.
pub const DEFAULT_AUDIENCE: &str = "authenticated";

/// Claims carried by a user token.
///
/// Timestamps are NumericDates and may be fractional or negative.
/// `aud` may be a string or an array of strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject, the issuer's identifier for the user
    pub sub: String,
    /// Expiration timestamp
    pub exp: f64,
    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
}

impl TokenClaims {
    /// Whether `exp` is at or before `now` (seconds since the epoch).
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now as f64
    }

    /// Whether `aud` names `audience`, either directly or as an array member.
    pub fn has_audience(&self, audience: &str) -> bool {
        match &self.aud {
            Some(serde_json::Value::String(aud)) => aud == audience,
            Some(serde_json::Value::Array(auds)) => {
                auds.iter().any(|aud| aud.as_str() == Some(audience))
            }
            _ => false,
        }
    }
}

/// Subject extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSubject(pub String);

impl VerifiedSubject {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The account behind the current request.
///
/// Lives in the request's extensions and is dropped with the request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    /// Internal account id
    pub account_id: AccountId,
    /// Public handle
    pub handle: String,
    /// Token subject the account was resolved from
    #[serde(skip)]
    pub subject: String,
}

impl From<Account> for AuthenticatedAccount {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.id,
            handle: account.public_handle,
            subject: account.external_subject_id,
        }
    }
}

/// Marker inserted into request extensions once the trusted-service gate
/// has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedCaller;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn authenticated_account_from_account() {
        let account = Account {
            id: 7,
            external_subject_id: "sub-7".into(),
            public_handle: "surfer7".into(),
            created_at: Utc::now(),
        };
        let auth = AuthenticatedAccount::from(account);
        assert_eq!(auth.account_id, 7);
        assert_eq!(auth.handle, "surfer7");
        assert_eq!(auth.subject, "sub-7");
    }

    #[test]
    fn claims_accept_array_audience() {
        let claims: TokenClaims = serde_json::from_value(serde_json::json!({
            "sub": "abc",
            "exp": 1,
            "aud": ["authenticated", "other"]
        }))
        .unwrap();
        assert_eq!(claims.sub, "abc");
        assert!(claims.iat.is_none());
        assert!(claims.has_audience("authenticated"));
        assert!(claims.has_audience("other"));
        assert!(!claims.has_audience("anon"));
    }

    #[test]
    fn claims_accept_fractional_and_negative_dates() {
        let claims: TokenClaims = serde_json::from_value(serde_json::json!({
            "sub": "abc",
            "exp": 1700000000.5,
            "iat": 1699990000.25,
            "aud": "authenticated"
        }))
        .unwrap();
        assert!(claims.is_expired_at(1_700_000_001));
        assert!(!claims.is_expired_at(1_700_000_000));
        assert!(claims.has_audience("authenticated"));

        let ancient: TokenClaims =
            serde_json::from_value(serde_json::json!({"sub": "abc", "exp": -1})).unwrap();
        assert!(ancient.is_expired_at(0));
        assert!(!ancient.has_audience("authenticated"));
    }
}
