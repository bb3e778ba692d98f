// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for mutations.
//!
//! Only the owning account may change a resource. Callers fetch the
//! resource and check existence first; ownership is checked second, so a
//! missing resource always reports `NotFound` rather than `ForbiddenNotOwner`.

use super::{AccountId, StoreError, StoreResult};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owning account's id.
    fn owner_id(&self) -> AccountId;

    /// Short label used in error messages.
    fn describe(&self) -> String {
        "resource".to_string()
    }
}

/// Does `account_id` own `resource`?
pub fn owns<R: OwnedResource + ?Sized>(resource: &R, account_id: AccountId) -> bool {
    resource.owner_id() == account_id
}

/// Trait for enforcing ownership on storage operations.
pub trait OwnershipEnforcer {
    /// Verify that the account owns this resource.
    ///
    /// # Errors
    /// Returns `StoreError::ForbiddenNotOwner` if it does not.
    fn verify_ownership(&self, account_id: AccountId) -> StoreResult<()>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_ownership(&self, account_id: AccountId) -> StoreResult<()> {
        if owns(self, account_id) {
            Ok(())
        } else {
            Err(StoreError::ForbiddenNotOwner {
                account_id,
                resource: self.describe(),
            })
        }
    }
}

/// Existence-then-ownership check on an optional lookup.
pub trait OwnershipCheck<T> {
    /// Verify ownership and return the resource if authorized.
    fn verify_owner(self, account_id: AccountId) -> StoreResult<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn verify_owner(self, account_id: AccountId) -> StoreResult<T> {
        match self {
            Some(resource) => {
                resource.verify_ownership(account_id)?;
                Ok(resource)
            }
            None => Err(StoreError::NotFound("resource".to_string())),
        }
    }
}
