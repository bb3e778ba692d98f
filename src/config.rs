// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! (and an optional `.env` file) once at startup and handed to [`AppState`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATABASE_PATH` | redb database file | `./data/kaisurf.redb` |
//! | `JWT_SECRET` | HS256 secret used to verify user tokens | Required for auth |
//! | `JWT_AUDIENCE` | Expected JWT audience claim | `authenticated` |
//! | `TRUSTED_SERVICE_API_KEY` | Shared key for server-to-server calls | Required for trusted endpoints |
//! | `SEED_ACCOUNTS` | `subject:handle` pairs provisioned at startup | none |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! [`AppState`]: crate::state::AppState

use std::env;
use std::path::PathBuf;

use secrecy::SecretString;

use crate::auth::claims::DEFAULT_AUDIENCE;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_AUDIENCE_ENV: &str = "JWT_AUDIENCE";
pub const TRUSTED_SERVICE_API_KEY_ENV: &str = "TRUSTED_SERVICE_API_KEY";
pub const SEED_ACCOUNTS_ENV: &str = "SEED_ACCOUNTS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_PATH: &str = "./data/kaisurf.redb";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Secrets and claim expectations used by the auth pipeline.
///
/// Both secrets are optional here: a missing value is reported per request
/// as `ServerMisconfigured`, never at startup.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<SecretString>,
    pub audience: String,
    pub trusted_service_key: Option<SecretString>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            audience: DEFAULT_AUDIENCE.to_string(),
            trusted_service_key: None,
        }
    }
}

/// An account to provision at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAccount {
    pub subject: String,
    pub handle: String,
}

/// Fully-resolved process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub log_format: LogFormat,
    pub auth: AuthConfig,
    pub seed_accounts: Vec<SeedAccount>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = non_empty(PORT_ENV)
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            host: non_empty(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_path: non_empty(DATABASE_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            log_format: non_empty(LOG_FORMAT_ENV)
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(LogFormat::Pretty),
            auth: AuthConfig {
                jwt_secret: non_empty(JWT_SECRET_ENV).map(SecretString::new),
                audience: non_empty(JWT_AUDIENCE_ENV)
                    .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
                trusted_service_key: non_empty(TRUSTED_SERVICE_API_KEY_ENV)
                    .map(SecretString::new),
            },
            seed_accounts: non_empty(SEED_ACCOUNTS_ENV)
                .map(|raw| parse_seed_accounts(&raw))
                .unwrap_or_default(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse `subject:handle,subject:handle`. Malformed pairs are skipped.
pub fn parse_seed_accounts(raw: &str) -> Vec<SeedAccount> {
    raw.split(',')
        .filter_map(|pair| {
            let (subject, handle) = pair.trim().split_once(':')?;
            let (subject, handle) = (subject.trim(), handle.trim());
            if subject.is_empty() || handle.is_empty() {
                return None;
            }
            Some(SeedAccount {
                subject: subject.to_string(),
                handle: handle.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.auth.audience, "authenticated");
        assert!(config.auth.jwt_secret.is_none());
        assert!(config.auth.trusted_service_key.is_none());
        assert!(config.seed_accounts.is_empty());
    }

    #[test]
    fn blank_secrets_count_as_missing() {
        let config = AppConfig::from_lookup(lookup(&[
            (JWT_SECRET_ENV, "   "),
            (TRUSTED_SERVICE_API_KEY_ENV, ""),
        ]));
        assert!(config.auth.jwt_secret.is_none());
        assert!(config.auth.trusted_service_key.is_none());
    }

    #[test]
    fn reads_secrets_and_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (PORT_ENV, "9090"),
            (JWT_SECRET_ENV, "s3cret"),
            (TRUSTED_SERVICE_API_KEY_ENV, "svc-key"),
            (LOG_FORMAT_ENV, "JSON"),
        ]));
        assert_eq!(config.port, 9090);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.auth.jwt_secret.as_ref().map(|s| s.expose_secret().as_str()),
            Some("s3cret")
        );
        assert_eq!(
            config
                .auth
                .trusted_service_key
                .as_ref()
                .map(|s| s.expose_secret().as_str()),
            Some("svc-key")
        );
    }

    #[test]
    fn unparsable_port_falls_back() {
        let config = AppConfig::from_lookup(lookup(&[(PORT_ENV, "http")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn seed_accounts_skip_malformed_pairs() {
        let seeds = parse_seed_accounts("sub-a:alice, bad ,sub-b:bob,:nohandle");
        assert_eq!(
            seeds,
            vec![
                SeedAccount {
                    subject: "sub-a".into(),
                    handle: "alice".into()
                },
                SeedAccount {
                    subject: "sub-b".into(),
                    handle: "bob".into()
                },
            ]
        );
    }

    #[test]
    fn debug_output_does_not_leak_secrets() {
        let config = AppConfig::from_lookup(lookup(&[(JWT_SECRET_ENV, "do-not-print")]));
        assert!(!format!("{config:?}").contains("do-not-print"));
    }
}
