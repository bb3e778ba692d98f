// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use kaisurf_server::{
    api::router,
    config::{AppConfig, JWT_SECRET_ENV, TRUSTED_SERVICE_API_KEY_ENV},
    logging::init_tracing,
    state::AppState,
    storage::{AccountRepository, Store},
};

#[tokio::main]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env();
    init_tracing(config.log_format);

    let store = Store::open(&config.database_path).expect("Failed to open database");
    tracing::info!(path = %config.database_path.display(), "Database opened");

    let accounts = AccountRepository::new(&store);
    for seed in &config.seed_accounts {
        if let Err(e) = accounts.ensure(&seed.subject, &seed.handle) {
            tracing::warn!(handle = %seed.handle, error = %e, "Failed to seed account");
        }
    }

    if config.auth.jwt_secret.is_none() {
        tracing::warn!("{JWT_SECRET_ENV} is not set; authenticated routes will return 500");
    }
    if config.auth.trusted_service_key.is_none() {
        tracing::warn!("{TRUSTED_SERVICE_API_KEY_ENV} is not set; trusted routes will return 500");
    }

    let bind_address = config.bind_address();
    let app = router(AppState::new(store, config.auth));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .expect("Failed to bind listener");
    tracing::info!("KAiSurf server listening on http://{bind_address} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
