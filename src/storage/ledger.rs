// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Kones ledger engine.
//!
//! ## Credit Transaction
//!
//! A credit performs four writes in one redb write transaction:
//!
//! 1. append an immutable [`LedgerEntry`]
//! 2. fetch-or-create the account balance (starting at 0) and add the amount
//! 3. add the amount to the profile's `total_earned`, if a profile exists
//! 4. append a `KONES_EARNED` audit event
//!
//! Either all four commit or none do. Because redb admits a single writer,
//! concurrent credits for the same account apply one after the other and no
//! increment is lost.
//!
//! ## Invariant
//!
//! After every committed transaction, for every account:
//! `balance == sum(entries.amount) == profile.total_earned` (the last only
//! when the profile existed before the first credit).
//!
//! ## Idempotency
//!
//! A caller may attach an idempotency key. A repeated key for the same
//! account writes nothing and reports the current balance. Reusing a key
//! with a different amount is rejected.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};

use super::audit::{self, AuditEvent, AuditEventType};
use super::database::{
    next_id, read_json, write_json, BALANCES, IDEMPOTENCY_KEYS, LEDGER_BY_ACCOUNT, LEDGER_ENTRIES,
    PROFILES,
};
use super::repository::Profile;
use super::{AccountId, Store, StoreError, StoreResult};

/// Description used when the caller supplies none.
pub const DEFAULT_EARN_DESCRIPTION: &str = "Content reward";

/// Kind of ledger transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Reward for content activity
    EarnContent,
}

impl TransactionType {
    /// Whether entries of this type count towards a profile's earned total.
    pub fn counts_as_earned(&self) -> bool {
        match self {
            TransactionType::EarnContent => true,
        }
    }
}

/// An immutable ledger line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: u64,
    pub account_id: AccountId,
    pub timestamp: DateTime<Utc>,
    pub transaction_type: TransactionType,
    /// Signed amount; credits are always positive
    pub amount: i64,
    pub description: String,
}

/// Result of a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditOutcome {
    /// Balance after the transaction
    pub new_balance: i64,
    /// Entry written by this call, or by the first call on a replay
    pub entry_id: u64,
    /// Amount of that entry
    pub amount: i64,
    /// True when an idempotency key matched and nothing was written
    pub replayed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("amount must be a positive integer, got {0}")]
    InvalidAmount(i64),

    #[error("idempotency key '{key}' was already used for a credit of {amount}")]
    IdempotencyConflict { key: String, amount: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Ledger engine bound to a store.
pub struct LedgerEngine<'a> {
    store: &'a Store,
}

impl<'a> LedgerEngine<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Credit `amount` to `account_id` and return the new balance.
    pub fn credit(
        &self,
        account_id: AccountId,
        amount: i64,
        description: &str,
        transaction_type: TransactionType,
    ) -> Result<i64, LedgerError> {
        self.credit_once(account_id, amount, description, transaction_type, None)
            .map(|outcome| outcome.new_balance)
    }

    /// Credit with an optional idempotency key.
    pub fn credit_once(
        &self,
        account_id: AccountId,
        amount: i64,
        description: &str,
        transaction_type: TransactionType,
        idempotency_key: Option<&str>,
    ) -> Result<CreditOutcome, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let outcome = self.commit_credit(
            account_id,
            amount,
            description,
            transaction_type,
            idempotency_key,
        )?;

        if outcome.replayed && outcome.amount != amount {
            tracing::warn!(
                account_id,
                amount,
                recorded_amount = outcome.amount,
                "Idempotency key reused with a different amount"
            );
            return Err(LedgerError::IdempotencyConflict {
                key: idempotency_key.unwrap_or_default().to_string(),
                amount: outcome.amount,
            });
        }

        if outcome.replayed {
            tracing::info!(
                account_id,
                entry_id = outcome.entry_id,
                "Idempotent credit replayed; no changes written"
            );
        } else {
            tracing::info!(
                account_id,
                amount,
                new_balance = outcome.new_balance,
                entry_id = outcome.entry_id,
                "Kones credited"
            );
        }
        Ok(outcome)
    }

    fn commit_credit(
        &self,
        account_id: AccountId,
        amount: i64,
        description: &str,
        transaction_type: TransactionType,
        idempotency_key: Option<&str>,
    ) -> StoreResult<CreditOutcome> {
        let write_txn = self.store.begin_write()?;

        let slot = idempotency_key.map(|k| idempotency_slot(account_id, k));
        if let Some(slot) = slot.as_deref() {
            let previous = {
                let table = write_txn.open_table(IDEMPOTENCY_KEYS)?;
                let entry_id = table.get(slot)?.map(|v| v.value());
                entry_id
            };
            if let Some(entry_id) = previous {
                let new_balance = read_balance(&write_txn, account_id)?.unwrap_or(0);
                let recorded = {
                    let table = write_txn.open_table(LEDGER_ENTRIES)?;
                    read_json::<LedgerEntry, _>(&table, entry_id)?
                };
                write_txn.abort()?;
                let recorded = recorded.ok_or_else(|| {
                    StoreError::NotFound(format!("Ledger entry {entry_id}"))
                })?;
                return Ok(CreditOutcome {
                    new_balance,
                    entry_id,
                    amount: recorded.amount,
                    replayed: true,
                });
            }
        }

        let (entry_id, new_balance) =
            apply_credit(&write_txn, account_id, amount, description, transaction_type)?;

        if let Some(slot) = slot.as_deref() {
            let mut table = write_txn.open_table(IDEMPOTENCY_KEYS)?;
            table.insert(slot, entry_id)?;
        }
        write_txn.commit()?;

        Ok(CreditOutcome {
            new_balance,
            entry_id,
            amount,
            replayed: false,
        })
    }

    /// Current balance; 0 for an account that has never been credited.
    pub fn balance(&self, account_id: AccountId) -> StoreResult<i64> {
        Ok(self.balance_record(account_id)?.unwrap_or(0))
    }

    /// The stored balance row, if one has been created.
    pub fn balance_record(&self, account_id: AccountId) -> StoreResult<Option<i64>> {
        let read_txn = self.store.begin_read()?;
        let table = read_txn.open_table(BALANCES)?;
        let balance = table.get(account_id)?.map(|v| v.value());
        Ok(balance)
    }

    /// All entries for an account in the order they were written.
    pub fn entries(&self, account_id: AccountId) -> StoreResult<Vec<LedgerEntry>> {
        let read_txn = self.store.begin_read()?;
        let index = read_txn.open_table(LEDGER_BY_ACCOUNT)?;
        let table = read_txn.open_table(LEDGER_ENTRIES)?;

        let mut entries = Vec::new();
        for item in index.range((account_id, 0u64)..=(account_id, u64::MAX))? {
            let (key, _) = item?;
            let (_, entry_id) = key.value();
            if let Some(entry) = read_json::<LedgerEntry, _>(&table, entry_id)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

fn idempotency_slot(account_id: AccountId, key: &str) -> String {
    format!("{account_id}:{key}")
}

fn read_balance(txn: &WriteTransaction, account_id: AccountId) -> StoreResult<Option<i64>> {
    let table = txn.open_table(BALANCES)?;
    let balance = table.get(account_id)?.map(|v| v.value());
    Ok(balance)
}

fn overflow(account_id: AccountId) -> StoreError {
    StoreError::InvalidInput(format!("Credit would overflow the balance of account {account_id}."))
}

/// The four credit effects, staged in `txn`. Nothing is visible until the
/// caller commits; dropping `txn` discards all of them.
pub(crate) fn apply_credit(
    txn: &WriteTransaction,
    account_id: AccountId,
    amount: i64,
    description: &str,
    transaction_type: TransactionType,
) -> StoreResult<(u64, i64)> {
    // 1. Ledger entry
    let entry = LedgerEntry {
        id: next_id(txn, "ledger_entries")?,
        account_id,
        timestamp: Utc::now(),
        transaction_type,
        amount,
        description: description.to_string(),
    };
    {
        let mut table = txn.open_table(LEDGER_ENTRIES)?;
        write_json(&mut table, entry.id, &entry)?;
        let mut index = txn.open_table(LEDGER_BY_ACCOUNT)?;
        index.insert((account_id, entry.id), ())?;
    }

    // 2. Balance (created at 0 on first touch)
    let new_balance = {
        let current = read_balance(txn, account_id)?.unwrap_or(0);
        let updated = current.checked_add(amount).ok_or_else(|| overflow(account_id))?;
        let mut table = txn.open_table(BALANCES)?;
        table.insert(account_id, updated)?;
        updated
    };

    // 3. Denormalized earned total; an absent profile is skipped, not created
    if transaction_type.counts_as_earned() {
        let mut table = txn.open_table(PROFILES)?;
        if let Some(mut profile) = read_json::<Profile, _>(&table, account_id)? {
            profile.total_earned = profile
                .total_earned
                .checked_add(amount)
                .ok_or_else(|| overflow(account_id))?;
            write_json(&mut table, account_id, &profile)?;
        }
    }

    // 4. Audit
    audit::append(
        txn,
        &AuditEvent::new(account_id, AuditEventType::KonesEarned)
            .with_payload(serde_json::json!({ "amount": amount, "reason": description })),
    )?;

    Ok((entry.id, new_balance))
}
