// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile repository.
//!
//! A profile is created lazily on the owner's first profile update. The
//! `total_earned` counter is only ever written by the ledger engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::audit::{self, AuditEvent, AuditEventType};
use super::super::database::{read_json, write_json, PROFILES};
use super::super::{AccountId, Store, StoreResult};

/// Bio given to a profile created by its first update.
pub const DEFAULT_BIO: &str = "A kinetic soul on the surf.";

/// Public profile, one-to-one with an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Profile {
    pub account_id: AccountId,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    /// Sum of all EARN ledger entries for the account
    pub total_earned: i64,
    pub last_seen_at: DateTime<Utc>,
}

impl Profile {
    fn new_default(account_id: AccountId) -> Self {
        Self {
            account_id,
            bio: Some(DEFAULT_BIO.to_string()),
            avatar_url: None,
            total_earned: 0,
            last_seen_at: Utc::now(),
        }
    }
}

/// Fields a caller may change on their own profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileChanges {
    /// Names of the fields present in this change set, for the audit trail.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.bio.is_some() {
            fields.push("bio");
        }
        if self.avatar_url.is_some() {
            fields.push("avatar_url");
        }
        fields
    }
}

/// Repository for profile operations.
pub struct ProfileRepository<'a> {
    store: &'a Store,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Get a profile by account id.
    pub fn get(&self, account_id: AccountId) -> StoreResult<Option<Profile>> {
        let read_txn = self.store.begin_read()?;
        let table = read_txn.open_table(PROFILES)?;
        read_json(&table, account_id)
    }

    /// Apply `changes` to the account's profile, creating it first if absent.
    ///
    /// Refreshes `last_seen_at` and appends a `PROFILE_UPDATED` audit event
    /// in the same transaction.
    pub fn upsert(&self, account_id: AccountId, changes: ProfileChanges) -> StoreResult<Profile> {
        let write_txn = self.store.begin_write()?;

        let profile = {
            let mut table = write_txn.open_table(PROFILES)?;
            let mut profile = read_json::<Profile, _>(&table, account_id)?
                .unwrap_or_else(|| Profile::new_default(account_id));

            if let Some(bio) = changes.bio.clone() {
                profile.bio = Some(bio);
            }
            if let Some(avatar_url) = changes.avatar_url.clone() {
                profile.avatar_url = Some(avatar_url);
            }
            profile.last_seen_at = Utc::now();

            write_json(&mut table, account_id, &profile)?;
            profile
        };

        audit::append(
            &write_txn,
            &AuditEvent::new(account_id, AuditEventType::ProfileUpdated)
                .with_payload(serde_json::json!({ "fields": changes.field_names() })),
        )?;
        write_txn.commit()?;

        Ok(profile)
    }
}
