// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `accounts`: account_id → serialized Account
//! - `accounts_by_subject`: external subject id → account_id
//! - `accounts_by_handle`: public handle → account_id
//! - `profiles`: account_id → serialized Profile
//! - `posts`: post_id → serialized Post
//! - `ledger_entries`: entry_id → serialized LedgerEntry
//! - `ledger_by_account`: (account_id, entry_id) → ()
//! - `balances`: account_id → current balance
//! - `idempotency_keys`: `account_id:key` → entry_id
//! - `audit_events`: event_seq → serialized AuditEvent
//! - `sequences`: sequence name → last allocated id
//!
//! redb admits one write transaction at a time, so every read-modify-write
//! performed inside [`Store::begin_write`] is serialised against all others.
//! A write transaction dropped without `commit` is rolled back.

use std::path::Path;

use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const ACCOUNTS: TableDefinition<u64, &[u8]> = TableDefinition::new("accounts");

pub(crate) const ACCOUNTS_BY_SUBJECT: TableDefinition<&str, u64> =
    TableDefinition::new("accounts_by_subject");

pub(crate) const ACCOUNTS_BY_HANDLE: TableDefinition<&str, u64> =
    TableDefinition::new("accounts_by_handle");

pub(crate) const PROFILES: TableDefinition<u64, &[u8]> = TableDefinition::new("profiles");

pub(crate) const POSTS: TableDefinition<u64, &[u8]> = TableDefinition::new("posts");

pub(crate) const LEDGER_ENTRIES: TableDefinition<u64, &[u8]> =
    TableDefinition::new("ledger_entries");

/// Index: (account_id, entry_id) for per-account range scans.
pub(crate) const LEDGER_BY_ACCOUNT: TableDefinition<(u64, u64), ()> =
    TableDefinition::new("ledger_by_account");

pub(crate) const BALANCES: TableDefinition<u64, i64> = TableDefinition::new("balances");

pub(crate) const IDEMPOTENCY_KEYS: TableDefinition<&str, u64> =
    TableDefinition::new("idempotency_keys");

pub(crate) const AUDIT_EVENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("audit_events");

const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("account {account_id} does not own {resource}")]
    ForbiddenNotOwner { account_id: u64, resource: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    /// True for errors that describe the caller's request rather than a
    /// fault in the database itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound(_)
                | StoreError::AlreadyExists(_)
                | StoreError::ForbiddenNotOwner { .. }
                | StoreError::InvalidInput(_)
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Store
// =============================================================================

/// Shared transactional store.
pub struct Store {
    db: Database,
}

impl Store {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(ACCOUNTS_BY_SUBJECT)?;
            let _ = write_txn.open_table(ACCOUNTS_BY_HANDLE)?;
            let _ = write_txn.open_table(PROFILES)?;
            let _ = write_txn.open_table(POSTS)?;
            let _ = write_txn.open_table(LEDGER_ENTRIES)?;
            let _ = write_txn.open_table(LEDGER_BY_ACCOUNT)?;
            let _ = write_txn.open_table(BALANCES)?;
            let _ = write_txn.open_table(IDEMPOTENCY_KEYS)?;
            let _ = write_txn.open_table(AUDIT_EVENTS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    pub(crate) fn begin_read(&self) -> StoreResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    /// Readiness probe: can a read transaction see the schema?
    pub fn check_readable(&self) -> StoreResult<()> {
        let read_txn = self.begin_read()?;
        read_txn.open_table(SEQUENCES)?;
        Ok(())
    }
}

// =============================================================================
// Row Helpers
// =============================================================================

/// Allocate the next id from a named sequence inside `txn`.
///
/// Must not be called while `sequences` is already open in the same
/// transaction.
pub(crate) fn next_id(txn: &WriteTransaction, sequence: &str) -> StoreResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let next = table.get(sequence)?.map(|v| v.value()).unwrap_or(0) + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

/// Read and deserialize a JSON row.
pub(crate) fn read_json<T, Tbl>(table: &Tbl, id: u64) -> StoreResult<Option<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<u64, &'static [u8]>,
{
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

/// Serialize and write a JSON row.
pub(crate) fn write_json<T: Serialize>(
    table: &mut redb::Table<'_, u64, &'static [u8]>,
    id: u64,
    value: &T,
) -> StoreResult<()> {
    let json = serde_json::to_vec(value)?;
    table.insert(id, json.as_slice())?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_store;

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("db.redb");
        let store = Store::open(&path).unwrap();
        assert!(path.exists());
        store.check_readable().unwrap();
    }

    #[test]
    fn sequences_are_monotonic_and_independent() {
        let (store, _dir) = temp_store();
        let txn = store.begin_write().unwrap();
        assert_eq!(next_id(&txn, "posts").unwrap(), 1);
        assert_eq!(next_id(&txn, "posts").unwrap(), 2);
        assert_eq!(next_id(&txn, "accounts").unwrap(), 1);
        txn.commit().unwrap();

        let txn = store.begin_write().unwrap();
        assert_eq!(next_id(&txn, "posts").unwrap(), 3);
    }

    #[test]
    fn uncommitted_write_is_rolled_back() {
        let (store, _dir) = temp_store();
        {
            let txn = store.begin_write().unwrap();
            next_id(&txn, "posts").unwrap();
            {
                let mut table = txn.open_table(BALANCES).unwrap();
                table.insert(7u64, 100i64).unwrap();
            }
            // dropped without commit
        }

        let read_txn = store.begin_read().unwrap();
        let balances = read_txn.open_table(BALANCES).unwrap();
        assert!(balances.get(7u64).unwrap().is_none());

        let txn = store.begin_write().unwrap();
        assert_eq!(next_id(&txn, "posts").unwrap(), 1);
    }

    #[test]
    fn json_rows_round_trip_through_tables() {
        let (store, _dir) = temp_store();
        let txn = store.begin_write().unwrap();
        {
            let mut table = txn.open_table(POSTS).unwrap();
            write_json(&mut table, 1, &serde_json::json!({"title": "T"})).unwrap();
        }
        txn.commit().unwrap();

        let read_txn = store.begin_read().unwrap();
        let table = read_txn.open_table(POSTS).unwrap();
        let row: Option<serde_json::Value> = read_json(&table, 1).unwrap();
        assert_eq!(row.unwrap()["title"], "T");
        let missing: Option<serde_json::Value> = read_json(&table, 2).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn client_errors_are_distinguished_from_faults() {
        assert!(StoreError::NotFound("post 1".into()).is_client_error());
        assert!(StoreError::ForbiddenNotOwner {
            account_id: 1,
            resource: "post 1".into()
        }
        .is_client_error());
        assert!(!StoreError::Io(std::io::Error::other("disk")).is_client_error());
    }
}
