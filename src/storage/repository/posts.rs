// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Post repository.
//!
//! Posts are never physically removed: delete clears the `active` flag and
//! the row is retained. An inactive post behaves exactly like a missing one
//! for reads and mutations.
//!
//! Mutations check existence, then ownership, then input, all inside the
//! write transaction that applies them.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};

use super::super::audit::{self, AuditEvent, AuditEventType};
use super::super::database::{next_id, read_json, write_json, POSTS};
use super::super::ownership::{OwnedResource, OwnershipCheck};
use super::super::{AccountId, PostId, Store, StoreError, StoreResult};

/// Maximum number of posts returned by a listing.
pub const LIST_LIMIT: usize = 100;

/// A content post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    /// Owning account
    pub owner_id: AccountId,
    pub title: String,
    pub body: String,
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// False once soft-deleted
    pub active: bool,
}

impl OwnedResource for Post {
    fn owner_id(&self) -> AccountId {
        self.owner_id
    }

    fn describe(&self) -> String {
        format!("post {}", self.id)
    }
}

/// Validated input for a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub media_url: Option<String>,
}

/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub media_url: Option<String>,
}

impl PostChanges {
    fn apply(self, post: &mut Post) -> StoreResult<()> {
        if let Some(title) = self.title {
            if title.trim().is_empty() {
                return Err(StoreError::InvalidInput("Title must not be empty.".into()));
            }
            post.title = title;
        }
        if let Some(body) = self.body {
            if body.trim().is_empty() {
                return Err(StoreError::InvalidInput("Content must not be empty.".into()));
            }
            post.body = body;
        }
        if let Some(media_url) = self.media_url {
            post.media_url = Some(media_url);
        }
        Ok(())
    }
}

/// Repository for post operations.
pub struct PostRepository<'a> {
    store: &'a Store,
}

impl<'a> PostRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Get a post by id, active or not.
    pub fn get(&self, post_id: PostId) -> StoreResult<Option<Post>> {
        let read_txn = self.store.begin_read()?;
        let table = read_txn.open_table(POSTS)?;
        read_json(&table, post_id)
    }

    /// Get a post only if it is active.
    pub fn get_active(&self, post_id: PostId) -> StoreResult<Option<Post>> {
        Ok(self.get(post_id)?.filter(|p| p.active))
    }

    /// Active posts, newest first, at most `limit`.
    pub fn list_active(&self, limit: usize) -> StoreResult<Vec<Post>> {
        let read_txn = self.store.begin_read()?;
        let table = read_txn.open_table(POSTS)?;

        // Ids are allocated monotonically, so reverse key order is newest-first.
        let mut posts = Vec::with_capacity(limit.min(LIST_LIMIT));
        for entry in table.iter()?.rev() {
            if posts.len() >= limit {
                break;
            }
            let (_, value) = entry?;
            let post: Post = serde_json::from_slice(value.value())?;
            if post.active {
                posts.push(post);
            }
        }
        Ok(posts)
    }

    /// Create a post owned by `owner_id`.
    pub fn create(&self, owner_id: AccountId, new_post: NewPost) -> StoreResult<Post> {
        let write_txn = self.store.begin_write()?;

        let post = Post {
            id: next_id(&write_txn, "posts")?,
            owner_id,
            title: new_post.title,
            body: new_post.body,
            media_url: new_post.media_url,
            created_at: Utc::now(),
            active: true,
        };

        {
            let mut table = write_txn.open_table(POSTS)?;
            write_json(&mut table, post.id, &post)?;
        }
        audit::append(
            &write_txn,
            &AuditEvent::new(owner_id, AuditEventType::PostCreated)
                .with_payload(serde_json::json!({ "post_id": post.id, "title": post.title })),
        )?;
        write_txn.commit()?;

        Ok(post)
    }

    /// Apply `changes` to an active post owned by `actor`.
    pub fn update(
        &self,
        post_id: PostId,
        actor: AccountId,
        changes: PostChanges,
    ) -> StoreResult<Post> {
        let write_txn = self.store.begin_write()?;

        let mut post = load_owned_active(&write_txn, post_id, actor)?;
        changes.apply(&mut post)?;
        {
            let mut table = write_txn.open_table(POSTS)?;
            write_json(&mut table, post.id, &post)?;
        }
        audit::append(
            &write_txn,
            &AuditEvent::new(actor, AuditEventType::PostUpdated)
                .with_payload(serde_json::json!({ "post_id": post.id })),
        )?;
        write_txn.commit()?;

        Ok(post)
    }

    /// Soft-delete an active post owned by `actor`.
    pub fn soft_delete(&self, post_id: PostId, actor: AccountId) -> StoreResult<Post> {
        let write_txn = self.store.begin_write()?;

        let mut post = load_owned_active(&write_txn, post_id, actor)?;
        post.active = false;
        {
            let mut table = write_txn.open_table(POSTS)?;
            write_json(&mut table, post.id, &post)?;
        }
        audit::append(
            &write_txn,
            &AuditEvent::new(actor, AuditEventType::PostDeleted)
                .with_payload(serde_json::json!({ "post_id": post.id })),
        )?;
        write_txn.commit()?;

        Ok(post)
    }
}

/// Existence (and active) first, ownership second.
fn load_owned_active(
    write_txn: &WriteTransaction,
    post_id: PostId,
    actor: AccountId,
) -> StoreResult<Post> {
    let table = write_txn.open_table(POSTS)?;
    read_json::<Post, _>(&table, post_id)?
        .filter(|p| p.active)
        .verify_owner(actor)
        .map_err(|e| match e {
            StoreError::NotFound(_) => StoreError::NotFound(format!("Post {post_id}")),
            other => other,
        })
}
