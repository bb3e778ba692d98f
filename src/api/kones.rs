// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    auth::TrustedAuth,
    error::ApiError,
    models::{CreditRequest, CreditResponse},
    state::AppState,
    storage::{ledger::DEFAULT_EARN_DESCRIPTION, LedgerEngine, TransactionType},
};

#[utoipa::path(
    post,
    path = "/v1/kones/earn",
    request_body = CreditRequest,
    tag = "Kones",
    security(("bearer" = [], "api_key" = [])),
    responses(
        (status = 200, body = CreditResponse),
        (status = 400, description = "Amount is not a positive integer"),
        (status = 409, description = "Idempotency key reused with a different amount"),
        (status = 403, description = "Trusted-service key missing or wrong")
    )
)]
pub async fn earn_kones(
    State(state): State<AppState>,
    TrustedAuth(account): TrustedAuth,
    payload: Result<Json<CreditRequest>, JsonRejection>,
) -> Result<Json<CreditResponse>, ApiError> {
    let Json(request) = payload?;

    // Floats, strings, booleans and out-of-range numbers have no i64 form.
    let amount = request
        .amount
        .as_ref()
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| ApiError::invalid_input("A positive integer amount is required."))?;
    let description = request
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EARN_DESCRIPTION.to_string());
    let idempotency_key = request.idempotency_key.filter(|k| !k.trim().is_empty());

    let outcome = LedgerEngine::new(&state.store).credit_once(
        account.account_id,
        amount,
        &description,
        TransactionType::EarnContent,
        idempotency_key.as_deref(),
    )?;

    let message = if outcome.replayed {
        "Credit already applied.".to_string()
    } else {
        format!("{amount} Kones awarded.")
    };

    Ok(Json(CreditResponse {
        message,
        new_balance: outcome.new_balance,
        replayed: outcome.replayed,
    }))
}
