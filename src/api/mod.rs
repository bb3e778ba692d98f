// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{enforce, AuthPipeline, PipelineState, API_KEY_HEADER},
    models::{
        CreatePostRequest, CreditRequest, CreditResponse, MessageResponse, PostListResponse,
        PostResponse, PostView, ProfileResponse, UpdatePostRequest, UpdateProfileRequest,
        WebhookSyncRequest, WebhookSyncResponse,
    },
    state::AppState,
    storage::Profile,
};

pub mod health;
pub mod kones;
pub mod posts;
pub mod profiles;
pub mod webhooks;

/// Wrap every method in `route` with the given auth pipeline.
fn guarded(
    route: MethodRouter<AppState>,
    state: &AppState,
    pipeline: AuthPipeline,
) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(
        PipelineState::new(state.clone(), pipeline),
        enforce,
    ))
}

pub fn router(state: AppState) -> Router {
    use AuthPipeline::{Identity, IdentityAndTrusted};

    let v1_routes = Router::new()
        .route("/content/posts", get(posts::list_posts))
        .route(
            "/content/post",
            guarded(post(posts::create_post), &state, Identity),
        )
        .route(
            "/content/post/{post_id}",
            get(posts::get_post).merge(guarded(
                put(posts::update_post).delete(posts::delete_post),
                &state,
                Identity,
            )),
        )
        .route("/user/profile/{account_id}", get(profiles::get_profile))
        .route(
            "/user/profile",
            guarded(put(profiles::update_profile), &state, Identity),
        )
        .route(
            "/kones/earn",
            guarded(post(kones::earn_kones), &state, IdentityAndTrusted),
        )
        .route(
            "/webhook/sync",
            guarded(post(webhooks::sync_webhook), &state, IdentityAndTrusted),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        posts::list_posts,
        posts::create_post,
        posts::get_post,
        posts::update_post,
        posts::delete_post,
        profiles::get_profile,
        profiles::update_profile,
        kones::earn_kones,
        webhooks::sync_webhook,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            CreatePostRequest,
            UpdatePostRequest,
            PostView,
            PostResponse,
            PostListResponse,
            UpdateProfileRequest,
            Profile,
            ProfileResponse,
            CreditRequest,
            CreditResponse,
            WebhookSyncRequest,
            WebhookSyncResponse,
            MessageResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Posts", description = "Content posts"),
        (name = "Profiles", description = "Public profiles"),
        (name = "Kones", description = "Kones ledger credits (trusted services)"),
        (name = "Webhooks", description = "Sync events (trusted services)"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
