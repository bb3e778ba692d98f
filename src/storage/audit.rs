// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit logging for state-changing operations.
//!
//! Audit events are append-only and written inside the same write
//! transaction as the change they describe. Nothing in the request path
//! reads them back; [`AuditRepository`] exists for forensics.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};

use super::database::{next_id, write_json, AUDIT_EVENTS};
use super::{AccountId, Store, StoreResult};

/// Types of auditable events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEventType {
    PostCreated,
    PostUpdated,
    PostDeleted,
    ProfileUpdated,
    KonesEarned,
    /// Event forwarded by a trusted service through the sync webhook.
    Webhook(String),
}

impl AuditEventType {
    /// Stored tag, e.g. `POST_CREATED` or `WEBHOOK_USER_SYNCED`.
    pub fn tag(&self) -> String {
        match self {
            AuditEventType::PostCreated => "POST_CREATED".to_string(),
            AuditEventType::PostUpdated => "POST_UPDATED".to_string(),
            AuditEventType::PostDeleted => "POST_DELETED".to_string(),
            AuditEventType::ProfileUpdated => "PROFILE_UPDATED".to_string(),
            AuditEventType::KonesEarned => "KONES_EARNED".to_string(),
            AuditEventType::Webhook(kind) => format!("WEBHOOK_{}", kind.to_uppercase()),
        }
    }
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID.
    pub event_id: String,
    /// Account the event belongs to.
    pub account_id: AccountId,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Free-form tag (see [`AuditEventType::tag`]).
    pub event_type: String,
    /// Opaque structured payload.
    pub payload: serde_json::Value,
}

impl AuditEvent {
    /// Create a new audit event with an empty payload.
    pub fn new(account_id: AccountId, event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            account_id,
            timestamp: Utc::now(),
            event_type: event_type.tag(),
            payload: serde_json::Value::Null,
        }
    }

    /// Attach the payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Append `event` as part of `txn`. It becomes visible only if `txn` commits.
pub(crate) fn append(txn: &WriteTransaction, event: &AuditEvent) -> StoreResult<u64> {
    let seq = next_id(txn, "audit_events")?;
    let mut table = txn.open_table(AUDIT_EVENTS)?;
    write_json(&mut table, seq, event)?;
    Ok(seq)
}

/// Repository for audit events.
pub struct AuditRepository<'a> {
    store: &'a Store,
}

impl<'a> AuditRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Record a standalone event in its own transaction.
    pub fn record(&self, event: &AuditEvent) -> StoreResult<()> {
        let write_txn = self.store.begin_write()?;
        append(&write_txn, event)?;
        write_txn.commit()?;
        Ok(())
    }

    /// All events for an account, oldest first.
    pub fn events_for_account(&self, account_id: AccountId) -> StoreResult<Vec<AuditEvent>> {
        let read_txn = self.store.begin_read()?;
        let table = read_txn.open_table(AUDIT_EVENTS)?;

        let mut events = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let event: AuditEvent = serde_json::from_slice(value.value())?;
            if event.account_id == account_id {
                events.push(event);
            }
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_store;

    #[test]
    fn tags_match_stored_names() {
        assert_eq!(AuditEventType::KonesEarned.tag(), "KONES_EARNED");
        assert_eq!(
            AuditEventType::Webhook("user_synced".into()).tag(),
            "WEBHOOK_USER_SYNCED"
        );
    }

    #[test]
    fn record_and_read_events() {
        let (store, _dir) = temp_store();
        let repo = AuditRepository::new(&store);

        repo.record(
            &AuditEvent::new(1, AuditEventType::Webhook("ping".into()))
                .with_payload(serde_json::json!({"n": 1})),
        )
        .unwrap();
        repo.record(&AuditEvent::new(2, AuditEventType::ProfileUpdated))
            .unwrap();
        repo.record(&AuditEvent::new(1, AuditEventType::PostCreated))
            .unwrap();

        let events = repo.events_for_account(1).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "WEBHOOK_PING");
        assert_eq!(events[0].payload["n"], 1);
        assert_eq!(events[1].event_type, "POST_CREATED");
    }

    #[test]
    fn appended_event_is_discarded_with_its_transaction() {
        let (store, _dir) = temp_store();
        {
            let txn = store.begin_write().unwrap();
            append(&txn, &AuditEvent::new(1, AuditEventType::KonesEarned)).unwrap();
        }
        assert!(AuditRepository::new(&store)
            .events_for_account(1)
            .unwrap()
            .is_empty());
    }
}
