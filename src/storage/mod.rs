// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state lives in a single embedded redb database. Every
//! mutation runs inside one write transaction together with the audit
//! events it produces, so a request either commits all of its effects or
//! none of them.
//!
//! ## Components
//!
//! - `database` - table layout, [`Store`] and [`StoreError`]
//! - `repository` - accounts, profiles and posts
//! - `ledger` - the Kones ledger engine (entries, balances, earned totals)
//! - `audit` - write-only forensic event sink
//! - `ownership` - owner-only mutation guard

pub mod audit;
pub mod database;
pub mod ledger;
pub mod ownership;
pub mod repository;

/// Internal numeric account identifier.
pub type AccountId = u64;

/// Post identifier.
pub type PostId = u64;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use database::{Store, StoreError, StoreResult};
pub use ledger::{CreditOutcome, LedgerEngine, LedgerEntry, LedgerError, TransactionType};
pub use ownership::{owns, OwnedResource, OwnershipCheck, OwnershipEnforcer};
pub use repository::{
    Account, AccountRepository, NewPost, Post, PostChanges, PostRepository, Profile,
    ProfileChanges, ProfileRepository, LIST_LIMIT,
};
