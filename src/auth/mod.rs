// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication and trusted-service gating.
//!
//! ## Auth Flow
//!
//! 1. The client authenticates with the identity provider and receives an
//!    HS256 token carrying `sub`, `exp` and `aud`
//! 2. The client sends `Authorization: Bearer <token>`
//! 3. The server:
//!    - verifies signature, expiry (no leeway) and audience
//!    - resolves `sub` to an internal account
//!    - on server-to-server routes, also checks `X-Api-Key`
//!
//! ## Security
//!
//! - The resolved account is request-scoped (request extensions only)
//! - Secrets are `SecretString` and never logged
//! - A missing secret is a per-request 500, not a startup failure

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod resolver;
pub mod trusted;
pub mod verifier;

pub use claims::{AuthenticatedAccount, TrustedCaller, VerifiedSubject};
pub use error::AuthError;
pub use extractor::{Auth, TrustedAuth};
pub use middleware::{authorize, enforce, AuthPipeline, PipelineState};
pub use resolver::IdentityResolver;
pub use trusted::{TrustedServiceGate, API_KEY_HEADER};
pub use verifier::{bearer_token, TokenVerifier};
