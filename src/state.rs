// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::storage::Store;

/// Shared application context, built once in `main` and cloned into every
/// request. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub auth_config: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(store: Store, auth_config: AuthConfig) -> Self {
        Self {
            store: Arc::new(store),
            auth_config: Arc::new(auth_config),
        }
    }

    /// Replace the auth configuration.
    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = Arc::new(auth_config);
        self
    }
}
