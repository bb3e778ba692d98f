// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KAiSurf Server - Content Sharing & Kones Ledger Service
//!
//! Posts and profiles behind bearer-token authentication with owner-only
//! mutation, plus an append-only ledger for the Kones point currency that
//! only trusted services may credit.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token verification, account resolution, trusted-service gate
//! - `storage` - redb store, ledger engine, ownership guard, audit log
//! - `config` - Environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
