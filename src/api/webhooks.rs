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
    models::{WebhookSyncRequest, WebhookSyncResponse},
    state::AppState,
    storage::{AuditEvent, AuditEventType, AuditRepository},
};

/// Record a sync event from a trusted service in the audit log as
/// `WEBHOOK_<EVENT_TYPE>`.
#[utoipa::path(
    post,
    path = "/v1/webhook/sync",
    request_body = WebhookSyncRequest,
    tag = "Webhooks",
    security(("bearer" = [], "api_key" = [])),
    responses(
        (status = 200, body = WebhookSyncResponse),
        (status = 400, description = "event_type blank or payload key absent"),
        (status = 403, description = "Trusted-service key missing or wrong")
    )
)]
pub async fn sync_webhook(
    State(state): State<AppState>,
    TrustedAuth(account): TrustedAuth,
    payload: Result<Json<WebhookSyncRequest>, JsonRejection>,
) -> Result<Json<WebhookSyncResponse>, ApiError> {
    let Json(request) = payload?;

    let missing = || ApiError::invalid_input("Request must include 'event_type' and 'payload'.");
    let event_type = request
        .event_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(missing)?;
    let body = request.payload.ok_or_else(missing)?;

    let event = AuditEvent::new(account.account_id, AuditEventType::Webhook(event_type))
        .with_payload(body);
    AuditRepository::new(&state.store).record(&event)?;
    tracing::info!(account_id = account.account_id, event_type = %event.event_type, "Webhook event recorded");

    Ok(Json(WebhookSyncResponse {
        status: "Webhook event processed.".to_string(),
    }))
}
