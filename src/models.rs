// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! Request fields are `Option` so that a missing field becomes a 400 from
//! the handler with a readable message instead of a deserializer error.
//!
//! ## Model Categories
//!
//! - **Posts**: content create/read/update/delete
//! - **Profiles**: public profile read and self-update
//! - **Kones**: ledger credits from trusted services
//! - **Webhooks**: sync events from trusted services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::{AccountId, Post, PostId, Profile};

// =============================================================================
// Post Models
// =============================================================================

/// Request to create a post.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    /// Post body; `content` is accepted as an alias.
    #[serde(alias = "content")]
    pub body: Option<String>,
    pub media_url: Option<String>,
}

/// Partial update of a post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    #[serde(alias = "content")]
    pub body: Option<String>,
    pub media_url: Option<String>,
}

/// A post as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostView {
    pub id: PostId,
    pub owner_id: AccountId,
    /// Owner's public handle
    pub author_handle: Option<String>,
    pub title: String,
    pub body: String,
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

impl PostView {
    pub fn new(post: Post, author_handle: Option<String>) -> Self {
        Self {
            id: post.id,
            owner_id: post.owner_id,
            author_handle,
            title: post.title,
            body: post.body,
            media_url: post.media_url,
            created_at: post.created_at,
            active: post.active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub post: PostView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostListResponse {
    /// Active posts, newest first
    pub posts: Vec<PostView>,
}

// =============================================================================
// Profile Models
// =============================================================================

/// Self-service profile update.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub profile: Profile,
}

// =============================================================================
// Kones Models
// =============================================================================

/// Credit request from a trusted service.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreditRequest {
    /// Strictly positive integer
    #[schema(value_type = i64)]
    pub amount: Option<serde_json::Value>,
    /// Defaults to "Content reward"
    pub description: Option<String>,
    /// Repeating a key for the same account credits only once
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreditResponse {
    pub message: String,
    pub new_balance: i64,
    /// True when the idempotency key had already been used
    pub replayed: bool,
}

// =============================================================================
// Webhook Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WebhookSyncRequest {
    pub event_type: Option<String>,
    /// `None` only when the key is absent; an explicit `null` is kept.
    #[serde(default, deserialize_with = "present_value")]
    #[schema(value_type = Object)]
    pub payload: Option<serde_json::Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookSyncResponse {
    pub status: String,
}

// =============================================================================
// Shared
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
