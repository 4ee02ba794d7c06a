//! HTTP routes for posts and their engagement
//!
//! - POST   /posts                        - Create a post
//! - PUT    /posts/{id}                   - Edit title/content (owner or admin)
//! - DELETE /posts/{id}                   - Delete (owner or admin)
//! - POST   /posts/{id}/like              - Toggle like
//! - POST   /posts/{id}/comments          - Add a comment
//! - DELETE /posts/{id}/comments/{cid}    - Remove a comment (author or admin)
//! - POST   /posts/{id}/share             - Re-post with share lineage

use bson::oid::ObjectId;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::auth::Principal;
use crate::db::schemas::{NotificationEntry, PostDoc};
use crate::engagement::LikeOutcome;
use crate::routes::respond::{
    self, authenticate, method_not_allowed, parse_id, parse_json_body, BoxBody,
};
use crate::server::AppState;
use crate::validate;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditPostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentRequest {
    pub comment: String,
}

/// POST /posts
async fn handle_create_post(
    req: Request<Incoming>,
    state: Arc<AppState>,
    principal: Principal,
) -> Response<BoxBody> {
    let body: CreatePostRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return respond::from_error(&e),
    };

    let title = match validate::non_empty("title", &body.title) {
        Ok(t) => t,
        Err(e) => return respond::failure(StatusCode::BAD_REQUEST, &e),
    };
    let content = match validate::non_empty("content", &body.content) {
        Ok(c) => c,
        Err(e) => return respond::failure(StatusCode::BAD_REQUEST, &e),
    };

    let post = PostDoc::new(title, content, principal.id);
    let id = match state.store.insert_post(post).await {
        Ok(id) => id,
        Err(e) => return respond::from_error(&e),
    };

    match state.store.find_post(id).await {
        Ok(Some(post)) => respond::success(
            StatusCode::CREATED,
            "Post created successfully",
            post.to_view(),
        ),
        Ok(None) => respond::failure(StatusCode::INTERNAL_SERVER_ERROR, "Post vanished"),
        Err(e) => respond::from_error(&e),
    }
}

/// PUT /posts/{id}
async fn handle_edit_post(
    req: Request<Incoming>,
    state: Arc<AppState>,
    principal: Principal,
    post_id: ObjectId,
) -> Response<BoxBody> {
    let body: EditPostRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return respond::from_error(&e),
    };

    if body.title.is_none() && body.content.is_none() {
        return respond::failure(StatusCode::BAD_REQUEST, "No updatable fields provided");
    }

    let post = match state.store.find_post(post_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return respond::failure(StatusCode::NOT_FOUND, "Post not found"),
        Err(e) => return respond::from_error(&e),
    };

    if !principal.owns_or_admin(post.author) {
        return respond::failure(
            StatusCode::FORBIDDEN,
            "You are not authorized to edit this post",
        );
    }

    let title = match body.title {
        Some(t) => match validate::non_empty("title", &t) {
            Ok(t) => t,
            Err(e) => return respond::failure(StatusCode::BAD_REQUEST, &e),
        },
        None => post.title.clone(),
    };
    let content = match body.content {
        Some(c) => match validate::non_empty("content", &c) {
            Ok(c) => c,
            Err(e) => return respond::failure(StatusCode::BAD_REQUEST, &e),
        },
        None => post.content.clone(),
    };

    match state.store.update_post_body(post_id, &title, &content).await {
        Ok(true) => {}
        Ok(false) => return respond::failure(StatusCode::NOT_FOUND, "Post not found"),
        Err(e) => return respond::from_error(&e),
    }

    match state.store.find_post(post_id).await {
        Ok(Some(post)) => respond::success(
            StatusCode::OK,
            "Post updated successfully",
            post.to_view(),
        ),
        Ok(None) => respond::failure(StatusCode::NOT_FOUND, "Post not found"),
        Err(e) => respond::from_error(&e),
    }
}

/// DELETE /posts/{id}
async fn handle_delete_post(
    state: Arc<AppState>,
    principal: Principal,
    post_id: ObjectId,
) -> Response<BoxBody> {
    let post = match state.store.find_post(post_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return respond::failure(StatusCode::NOT_FOUND, "Post not found"),
        Err(e) => return respond::from_error(&e),
    };

    if !principal.owns_or_admin(post.author) {
        return respond::failure(
            StatusCode::FORBIDDEN,
            "You are not authorized to delete this post",
        );
    }

    match state.store.delete_post(post_id).await {
        Ok(true) => respond::success_message(StatusCode::OK, "Post deleted successfully"),
        Ok(false) => respond::failure(StatusCode::NOT_FOUND, "Post not found"),
        Err(e) => respond::from_error(&e),
    }
}

/// POST /posts/{id}/like
async fn handle_like(
    state: Arc<AppState>,
    principal: Principal,
    post_id: ObjectId,
) -> Response<BoxBody> {
    match state.engagement.toggle_like(post_id, principal.id).await {
        Ok(outcome) => {
            let message = match outcome {
                LikeOutcome::Liked => "Post liked successfully",
                LikeOutcome::Unliked => "Post unliked successfully",
            };
            respond::success(StatusCode::OK, message, outcome)
        }
        Err(e) => respond::from_error(&e),
    }
}

/// POST /posts/{id}/comments
async fn handle_comment(
    req: Request<Incoming>,
    state: Arc<AppState>,
    principal: Principal,
    post_id: ObjectId,
) -> Response<BoxBody> {
    let body: CommentRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return respond::from_error(&e),
    };

    let comment = match state
        .engagement
        .add_comment(post_id, principal.id, &body.comment)
        .await
    {
        Ok(c) => c,
        Err(e) => return respond::from_error(&e),
    };

    // Tell the post author, unless they commented on their own post
    if let Ok(Some(post)) = state.store.find_post(post_id).await {
        if post.author != principal.id {
            if let Ok(Some(commenter)) = state.store.find_user(principal.id).await {
                let note = NotificationEntry::new(format!(
                    "@{} commented on your post \"{}\"",
                    commenter.username, post.title
                ));
                if let Err(e) = state.store.push_notification(post.author, note).await {
                    warn!("Failed to push comment notification: {}", e);
                }
            }
        }
    }

    respond::success(
        StatusCode::CREATED,
        "Comment added successfully",
        comment.to_view(),
    )
}

/// DELETE /posts/{id}/comments/{cid}
async fn handle_delete_comment(
    state: Arc<AppState>,
    principal: Principal,
    post_id: ObjectId,
    comment_id: ObjectId,
) -> Response<BoxBody> {
    match state
        .engagement
        .remove_comment(post_id, comment_id, &principal)
        .await
    {
        Ok(()) => respond::success_message(StatusCode::OK, "Comment deleted successfully"),
        Err(e) => respond::from_error(&e),
    }
}

/// POST /posts/{id}/share
async fn handle_share(
    state: Arc<AppState>,
    principal: Principal,
    post_id: ObjectId,
) -> Response<BoxBody> {
    let original = match state.store.find_post(post_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return respond::failure(StatusCode::NOT_FOUND, "Post not found"),
        Err(e) => return respond::from_error(&e),
    };

    let share = PostDoc::share_of(&original, principal.id);
    let id = match state.store.insert_post(share).await {
        Ok(id) => id,
        Err(e) => return respond::from_error(&e),
    };

    match state.store.find_post(id).await {
        Ok(Some(post)) => respond::success(
            StatusCode::CREATED,
            "Post shared successfully",
            post.to_view(),
        ),
        Ok(None) => respond::failure(StatusCode::INTERNAL_SERVER_ERROR, "Post vanished"),
        Err(e) => respond::from_error(&e),
    }
}

/// Route /posts/* requests. Returns None for paths outside this family.
pub async fn handle_post_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    if !path.starts_with("/posts") {
        return None;
    }

    let path = path.split('?').next().unwrap_or(path).to_string();
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let method = req.method().clone();

    let principal = match authenticate(&req, &state) {
        Ok(p) => p,
        Err(e) => return Some(respond::from_error(&e)),
    };

    let segment_refs: Vec<&str> = segments.iter().map(String::as_str).collect();

    let response = match (&method, segment_refs.as_slice()) {
        (&Method::POST, ["posts"]) => handle_create_post(req, state, principal).await,
        (&Method::PUT, ["posts", id]) => match parse_id(id) {
            Ok(id) => handle_edit_post(req, state, principal, id).await,
            Err(e) => respond::from_error(&e),
        },
        (&Method::DELETE, ["posts", id]) => match parse_id(id) {
            Ok(id) => handle_delete_post(state, principal, id).await,
            Err(e) => respond::from_error(&e),
        },
        (&Method::POST, ["posts", id, "like"]) => match parse_id(id) {
            Ok(id) => handle_like(state, principal, id).await,
            Err(e) => respond::from_error(&e),
        },
        (&Method::POST, ["posts", id, "comments"]) => match parse_id(id) {
            Ok(id) => handle_comment(req, state, principal, id).await,
            Err(e) => respond::from_error(&e),
        },
        (&Method::DELETE, ["posts", id, "comments", cid]) => {
            match (parse_id(id), parse_id(cid)) {
                (Ok(id), Ok(cid)) => handle_delete_comment(state, principal, id, cid).await,
                (Err(e), _) | (_, Err(e)) => respond::from_error(&e),
            }
        }
        (&Method::POST, ["posts", id, "share"]) => match parse_id(id) {
            Ok(id) => handle_share(state, principal, id).await,
            Err(e) => respond::from_error(&e),
        },

        (_, ["posts", ..]) => method_not_allowed(),
        _ => respond::not_found(&path),
    };

    Some(response)
}
