// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Maps a verified subject to its internal account.

use super::claims::{AuthenticatedAccount, VerifiedSubject};
use super::AuthError;
use crate::storage::{AccountRepository, Store};

pub struct IdentityResolver<'a> {
    accounts: AccountRepository<'a>,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            accounts: AccountRepository::new(store),
        }
    }

    /// Look up the single account bound to `subject`.
    ///
    /// `UnknownAccount` means the token was fine but the account has not
    /// been provisioned yet.
    pub fn resolve(&self, subject: &VerifiedSubject) -> Result<AuthenticatedAccount, AuthError> {
        match self.accounts.find_by_subject(subject.as_str()) {
            Ok(Some(account)) => Ok(account.into()),
            Ok(None) => Err(AuthError::UnknownAccount),
            Err(e) => {
                tracing::error!(error = %e, "Account lookup failed");
                Err(AuthError::Internal)
            }
        }
    }
}
