// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use std::io;
use std::sync::{Arc, Mutex};

use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::SecretString;
use tempfile::TempDir;

use crate::auth::claims::{TokenClaims, DEFAULT_AUDIENCE};
use crate::config::AuthConfig;
use crate::state::AppState;
use crate::storage::{AccountRepository, Store};

pub const TEST_JWT_SECRET: &str = "test-signing-secret-with-enough-bytes";
pub const TEST_API_KEY: &str = "test-trusted-service-key";

/// Subjects of the accounts seeded by [`test_state`] (ids 1 and 2).
pub const ALICE_SUBJECT: &str = "sub-alice";
pub const BOB_SUBJECT: &str = "sub-bob";

pub fn temp_store() -> (Store, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(&dir.path().join("test.redb")).unwrap();
    (store, dir)
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Some(SecretString::new(TEST_JWT_SECRET.to_string())),
        audience: DEFAULT_AUDIENCE.to_string(),
        trusted_service_key: Some(SecretString::new(TEST_API_KEY.to_string())),
    }
}

/// State with both secrets configured and two accounts:
/// alice (id 1) and bob (id 2).
pub fn test_state() -> (AppState, TempDir) {
    let (store, dir) = temp_store();
    let accounts = AccountRepository::new(&store);
    accounts.provision(ALICE_SUBJECT, "alice").unwrap();
    accounts.provision(BOB_SUBJECT, "bob").unwrap();
    (AppState::new(store, test_auth_config()), dir)
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Sign a token with the test secret expiring `exp_offset` seconds from now.
pub fn mint_token(subject: &str, exp_offset: i64, audience: &str) -> String {
    mint_token_with_secret(subject, exp_offset, audience, TEST_JWT_SECRET)
}

pub fn mint_token_with_secret(
    subject: &str,
    exp_offset: i64,
    audience: &str,
    secret: &str,
) -> String {
    let claims = TokenClaims {
        sub: subject.to_string(),
        exp: (now() + exp_offset) as f64,
        iat: Some(now() as f64),
        aud: Some(serde_json::Value::String(audience.to_string())),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Sign an arbitrary claims object with the test secret.
pub fn sign_claims(claims: &serde_json::Value) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// `Bearer <token>` for a live token issued to `subject`.
pub fn bearer_for(subject: &str) -> String {
    format!("Bearer {}", mint_token(subject, 3600, DEFAULT_AUDIENCE))
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return everything it logged.
pub fn capture_logs<F: FnOnce()>(f: F) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}
