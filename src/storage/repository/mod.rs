// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the store.
//!
//! Each repository provides the keyed get, unique-field lookup, insert,
//! update and listing primitives for one entity type.

pub mod accounts;
pub mod posts;
pub mod profiles;

pub use accounts::{Account, AccountRepository};
pub use posts::{NewPost, Post, PostChanges, PostRepository, LIST_LIMIT};
pub use profiles::{Profile, ProfileChanges, ProfileRepository, DEFAULT_BIO};
