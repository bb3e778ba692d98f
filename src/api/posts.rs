// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        CreatePostRequest, MessageResponse, PostListResponse, PostResponse, PostView,
        UpdatePostRequest,
    },
    state::AppState,
    storage::{
        AccountRepository, NewPost, OwnershipEnforcer, Post, PostChanges, PostId,
        PostRepository, LIST_LIMIT,
    },
};

fn post_not_found() -> ApiError {
    ApiError::not_found("Post not found.")
}

fn with_author(state: &AppState, post: Post) -> Result<PostView, ApiError> {
    let handle = AccountRepository::new(&state.store)
        .get(post.owner_id)?
        .map(|a| a.public_handle);
    Ok(PostView::new(post, handle))
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[utoipa::path(
    get,
    path = "/v1/content/posts",
    tag = "Posts",
    responses((status = 200, body = PostListResponse))
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<PostListResponse>, ApiError> {
    let posts = PostRepository::new(&state.store).list_active(LIST_LIMIT)?;
    let handles = AccountRepository::new(&state.store).handles_for(posts.iter().map(|p| p.owner_id))?;

    let posts = posts
        .into_iter()
        .map(|post| {
            let handle = handles.get(&post.owner_id).cloned();
            PostView::new(post, handle)
        })
        .collect();
    Ok(Json(PostListResponse { posts }))
}

#[utoipa::path(
    post,
    path = "/v1/content/post",
    request_body = CreatePostRequest,
    tag = "Posts",
    security(("bearer" = [])),
    responses(
        (status = 201, body = PostResponse),
        (status = 400, description = "Title or body missing"),
        (status = 401, description = "Missing, invalid or expired token")
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    Auth(account): Auth,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let Json(request) = payload?;

    let (Some(title), Some(body)) = (required(request.title), required(request.body)) else {
        return Err(ApiError::invalid_input("Title and content are required fields."));
    };

    let post = PostRepository::new(&state.store).create(
        account.account_id,
        NewPost {
            title,
            body,
            media_url: request.media_url,
        },
    )?;
    tracing::info!(post_id = post.id, account_id = account.account_id, "Post created");

    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            message: Some("Post created successfully.".to_string()),
            post: PostView::new(post, Some(account.handle)),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/content/post/{post_id}",
    params(("post_id" = u64, Path, description = "Post identifier")),
    tag = "Posts",
    responses(
        (status = 200, body = PostResponse),
        (status = 404, description = "Post missing or deleted")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = PostRepository::new(&state.store)
        .get_active(post_id)?
        .ok_or_else(post_not_found)?;

    Ok(Json(PostResponse {
        message: None,
        post: with_author(&state, post)?,
    }))
}

#[utoipa::path(
    put,
    path = "/v1/content/post/{post_id}",
    params(("post_id" = u64, Path, description = "Post identifier")),
    request_body = UpdatePostRequest,
    tag = "Posts",
    security(("bearer" = [])),
    responses(
        (status = 200, body = PostResponse),
        (status = 403, description = "Caller does not own the post"),
        (status = 404, description = "Post missing or deleted")
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    Auth(account): Auth,
    Path(post_id): Path<PostId>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    let posts = PostRepository::new(&state.store);

    // Existence and ownership are reported before any problem with the body.
    posts
        .get_active(post_id)?
        .ok_or_else(post_not_found)?
        .verify_ownership(account.account_id)?;
    let Json(request) = payload?;

    let post = posts.update(
        post_id,
        account.account_id,
        PostChanges {
            title: request.title,
            body: request.body,
            media_url: request.media_url,
        },
    )?;

    Ok(Json(PostResponse {
        message: Some("Post updated successfully.".to_string()),
        post: PostView::new(post, Some(account.handle)),
    }))
}

#[utoipa::path(
    delete,
    path = "/v1/content/post/{post_id}",
    params(("post_id" = u64, Path, description = "Post identifier")),
    tag = "Posts",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 403, description = "Caller does not own the post"),
        (status = 404, description = "Post missing or already deleted")
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    Auth(account): Auth,
    Path(post_id): Path<PostId>,
) -> Result<Json<MessageResponse>, ApiError> {
    PostRepository::new(&state.store).soft_delete(post_id, account.account_id)?;
    tracing::info!(post_id, account_id = account.account_id, "Post soft-deleted");

    Ok(Json(MessageResponse {
        message: "Post soft-deleted successfully.".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedAccount;
    use crate::test_support::{test_state, ALICE_SUBJECT, BOB_SUBJECT};

    fn alice() -> Auth {
        Auth(AuthenticatedAccount {
            account_id: 1,
            handle: "alice".into(),
            subject: ALICE_SUBJECT.into(),
        })
    }

    fn bob() -> Auth {
        Auth(AuthenticatedAccount {
            account_id: 2,
            handle: "bob".into(),
            subject: BOB_SUBJECT.into(),
        })
    }

    fn create_request(title: &str, body: &str) -> CreatePostRequest {
        CreatePostRequest {
            title: Some(title.into()),
            body: Some(body.into()),
            media_url: None,
        }
    }

    async fn create_as_alice(state: &AppState) -> PostView {
        let (_, Json(created)) = create_post(
            State(state.clone()),
            alice(),
            Ok(Json(create_request("T", "B"))),
        )
        .await
        .expect("post creation succeeds");
        created.post
    }

    #[tokio::test]
    async fn create_post_success() {
        let (state, _dir) = test_state();
        let (status, Json(created)) = create_post(
            State(state.clone()),
            alice(),
            Ok(Json(create_request("T", "B"))),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(created.post.active);
        assert_eq!(created.post.owner_id, 1);
        assert_eq!(created.post.author_handle.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn create_post_requires_title_and_body() {
        let (state, _dir) = test_state();
        for request in [
            create_request("", "B"),
            create_request("T", "   "),
            CreatePostRequest {
                title: Some("T".into()),
                body: None,
                media_url: None,
            },
        ] {
            let err = create_post(State(state.clone()), alice(), Ok(Json(request)))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
        assert!(list_posts(State(state)).await.unwrap().0.posts.is_empty());
    }

    #[tokio::test]
    async fn get_post_includes_author_handle() {
        let (state, _dir) = test_state();
        let post = create_as_alice(&state).await;

        let Json(fetched) = get_post(State(state), Path(post.id)).await.unwrap();
        assert_eq!(fetched.post.id, post.id);
        assert_eq!(fetched.post.author_handle.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn update_post_by_owner_changes_supplied_fields() {
        let (state, _dir) = test_state();
        let post = create_as_alice(&state).await;

        let Json(updated) = update_post(
            State(state),
            alice(),
            Path(post.id),
            Ok(Json(UpdatePostRequest {
                body: Some("B2".into()),
                ..Default::default()
            })),
        )
        .await
        .unwrap();

        assert_eq!(updated.post.title, "T");
        assert_eq!(updated.post.body, "B2");
    }

    #[tokio::test]
    async fn update_post_by_other_account_is_forbidden() {
        let (state, _dir) = test_state();
        let post = create_as_alice(&state).await;

        let err = update_post(
            State(state.clone()),
            bob(),
            Path(post.id),
            Ok(Json(UpdatePostRequest {
                title: Some("hijacked".into()),
                ..Default::default()
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let Json(fetched) = get_post(State(state), Path(post.id)).await.unwrap();
        assert_eq!(fetched.post.title, "T");
    }

    #[tokio::test]
    async fn update_missing_post_is_not_found() {
        let (state, _dir) = test_state();
        let err = update_post(
            State(state),
            alice(),
            Path(999),
            Ok(Json(UpdatePostRequest::default())),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn soft_delete_hides_post_everywhere() {
        let (state, _dir) = test_state();
        let post = create_as_alice(&state).await;

        let err = delete_post(State(state.clone()), bob(), Path(post.id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        delete_post(State(state.clone()), alice(), Path(post.id))
            .await
            .unwrap();

        let err = get_post(State(state.clone()), Path(post.id)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(list_posts(State(state.clone())).await.unwrap().0.posts.is_empty());

        let err = delete_post(State(state.clone()), alice(), Path(post.id))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = update_post(
            State(state),
            alice(),
            Path(post.id),
            Ok(Json(UpdatePostRequest::default())),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_posts_is_newest_first() {
        let (state, _dir) = test_state();
        let first = create_as_alice(&state).await;
        let (_, Json(second)) = create_post(
            State(state.clone()),
            bob(),
            Ok(Json(create_request("Bob's", "post"))),
        )
        .await
        .unwrap();

        let Json(listed) = list_posts(State(state)).await.unwrap();
        let ids: Vec<PostId> = listed.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.post.id, first.id]);
        assert_eq!(listed.posts[0].author_handle.as_deref(), Some("bob"));
    }
}
