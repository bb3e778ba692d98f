// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account repository.
//!
//! Accounts are normally created by the external identity sync process;
//! [`AccountRepository::provision`] stands in for it at startup and in tests.
//! The external subject id and the public handle are both unique.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use super::super::database::{
    next_id, read_json, write_json, ACCOUNTS, ACCOUNTS_BY_HANDLE, ACCOUNTS_BY_SUBJECT,
};
use super::super::{AccountId, Store, StoreError, StoreResult};

/// Internal identity record, one per token subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    /// Internal numeric identifier
    pub id: AccountId,
    /// Subject claim issued by the token provider (immutable)
    pub external_subject_id: String,
    /// Unique display identifier
    pub public_handle: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for account lookups and provisioning.
pub struct AccountRepository<'a> {
    store: &'a Store,
}

impl<'a> AccountRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Get an account by internal id.
    pub fn get(&self, account_id: AccountId) -> StoreResult<Option<Account>> {
        let read_txn = self.store.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        read_json(&table, account_id)
    }

    /// Look up the account bound to a token subject.
    pub fn find_by_subject(&self, subject: &str) -> StoreResult<Option<Account>> {
        let read_txn = self.store.begin_read()?;
        let index = read_txn.open_table(ACCOUNTS_BY_SUBJECT)?;
        let Some(account_id) = index.get(subject)?.map(|v| v.value()) else {
            return Ok(None);
        };
        let table = read_txn.open_table(ACCOUNTS)?;
        read_json(&table, account_id)
    }

    /// Resolve public handles for a set of account ids in one read.
    pub fn handles_for(
        &self,
        account_ids: impl IntoIterator<Item = AccountId>,
    ) -> StoreResult<HashMap<AccountId, String>> {
        let read_txn = self.store.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;

        let mut handles = HashMap::new();
        for account_id in account_ids {
            if handles.contains_key(&account_id) {
                continue;
            }
            if let Some(account) = read_json::<Account, _>(&table, account_id)? {
                handles.insert(account_id, account.public_handle);
            }
        }
        Ok(handles)
    }

    /// Create an account for `subject`.
    ///
    /// Fails with `AlreadyExists` if either the subject or the handle is
    /// already bound to another account.
    pub fn provision(&self, subject: &str, handle: &str) -> StoreResult<Account> {
        let subject = subject.trim();
        let handle = handle.trim();
        if subject.is_empty() || handle.is_empty() {
            return Err(StoreError::InvalidInput(
                "subject and handle must not be empty".to_string(),
            ));
        }

        let write_txn = self.store.begin_write()?;
        {
            let by_subject = write_txn.open_table(ACCOUNTS_BY_SUBJECT)?;
            if by_subject.get(subject)?.is_some() {
                return Err(StoreError::AlreadyExists(format!("Account for subject {subject}")));
            }
            let by_handle = write_txn.open_table(ACCOUNTS_BY_HANDLE)?;
            if by_handle.get(handle)?.is_some() {
                return Err(StoreError::AlreadyExists(format!("Handle {handle}")));
            }
        }

        let account = Account {
            id: next_id(&write_txn, "accounts")?,
            external_subject_id: subject.to_string(),
            public_handle: handle.to_string(),
            created_at: Utc::now(),
        };

        {
            let mut table = write_txn.open_table(ACCOUNTS)?;
            write_json(&mut table, account.id, &account)?;

            let mut by_subject = write_txn.open_table(ACCOUNTS_BY_SUBJECT)?;
            by_subject.insert(subject, account.id)?;

            let mut by_handle = write_txn.open_table(ACCOUNTS_BY_HANDLE)?;
            by_handle.insert(handle, account.id)?;
        }
        write_txn.commit()?;

        tracing::info!(
            account_id = account.id,
            handle = %account.public_handle,
            "Account provisioned"
        );
        Ok(account)
    }

    /// Provision `subject` unless it already exists; returns the account
    /// either way. Used by startup seeding so restarts are harmless.
    pub fn ensure(&self, subject: &str, handle: &str) -> StoreResult<Account> {
        if let Some(existing) = self.find_by_subject(subject.trim())? {
            return Ok(existing);
        }
        self.provision(subject, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_store;

    #[test]
    fn provision_assigns_sequential_ids() {
        let (store, _dir) = temp_store();
        let repo = AccountRepository::new(&store);

        let alice = repo.provision("sub-alice", "alice").unwrap();
        let bob = repo.provision("sub-bob", "bob").unwrap();

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(repo.get(2).unwrap().unwrap().public_handle, "bob");
    }

    #[test]
    fn lookup_by_subject_and_id() {
        let (store, _dir) = temp_store();
        let repo = AccountRepository::new(&store);
        let alice = repo.provision("sub-alice", "alice").unwrap();

        assert_eq!(repo.find_by_subject("sub-alice").unwrap(), Some(alice.clone()));
        assert_eq!(repo.get(alice.id).unwrap(), Some(alice));
        assert!(repo.find_by_subject("sub-nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_subject_or_handle_is_rejected() {
        let (store, _dir) = temp_store();
        let repo = AccountRepository::new(&store);
        repo.provision("sub-alice", "alice").unwrap();

        assert!(matches!(
            repo.provision("sub-alice", "alice2"),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(matches!(
            repo.provision("sub-other", "alice"),
            Err(StoreError::AlreadyExists(_))
        ));
        // The failed attempts must not have consumed ids or left index rows.
        assert_eq!(repo.provision("sub-bob", "bob").unwrap().id, 2);
    }

    #[test]
    fn ensure_is_idempotent() {
        let (store, _dir) = temp_store();
        let repo = AccountRepository::new(&store);
        let first = repo.ensure("sub-alice", "alice").unwrap();
        let second = repo.ensure("sub-alice", "alice").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn handles_for_skips_unknown_ids() {
        let (store, _dir) = temp_store();
        let repo = AccountRepository::new(&store);
        repo.provision("sub-alice", "alice").unwrap();

        let handles = repo.handles_for([1, 1, 42]).unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles.get(&1).map(String::as_str), Some("alice"));
    }
}
