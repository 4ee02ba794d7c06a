//! HTTP routes for user profiles and the social graph
//!
//! - GET  /users/{id}                    - Public profile
//! - PUT  /users/{id}                    - Allow-listed profile update
//! - POST /users/{id}/follow             - Toggle follow on a target user
//! - GET  /users/{id}/followers          - Follower listing
//! - GET  /users/{id}/following          - Following listing
//! - GET  /users/{id}/notifications      - Notification inbox
//! - POST /users/{id}/notifications/mark - Mark notifications read/unread
//! - GET  /users/{id}/posts              - Posts authored by a user
//!
//! All routes require an authenticated principal.

use bson::oid::ObjectId;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::db::schemas::{NotificationEntry, PostView, SocialLinks, UserSummary};
use crate::db::store::ProfileChanges;
use crate::graph::FollowOutcome;
use crate::routes::respond::{
    self, authenticate, method_not_allowed, parse_id, parse_json_body, BoxBody,
};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub social_links: Option<SocialLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FollowRequest {
    pub target_user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarkNotificationsRequest {
    pub notification_ids: Vec<String>,
    pub is_read: bool,
}

/// GET /users/{id}
async fn handle_get_profile(state: Arc<AppState>, user_id: ObjectId) -> Response<BoxBody> {
    match state.store.find_user(user_id).await {
        Ok(Some(user)) => respond::success(
            StatusCode::OK,
            "User profile retrieved successfully",
            user.to_profile(),
        ),
        Ok(None) => respond::failure(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => respond::from_error(&e),
    }
}

/// PUT /users/{id}
async fn handle_update_profile(
    req: Request<Incoming>,
    state: Arc<AppState>,
    user_id: ObjectId,
) -> Response<BoxBody> {
    let principal = match authenticate(&req, &state) {
        Ok(p) => p,
        Err(e) => return respond::from_error(&e),
    };

    if !principal.owns_or_admin(user_id) {
        return respond::failure(
            StatusCode::FORBIDDEN,
            "You are not authorized to update this profile",
        );
    }

    let body: UpdateProfileRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return respond::from_error(&e),
    };

    let changes = ProfileChanges {
        name: body.name,
        bio: body.bio,
        avatar: body.avatar,
        social_links: body.social_links,
    };
    if changes.is_empty() {
        return respond::failure(StatusCode::BAD_REQUEST, "No updatable fields provided");
    }

    match state.store.update_user_profile(user_id, changes).await {
        Ok(true) => {}
        Ok(false) => return respond::failure(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => return respond::from_error(&e),
    }

    match state.store.find_user(user_id).await {
        Ok(Some(user)) => respond::success(
            StatusCode::OK,
            "User profile updated successfully",
            user.to_profile(),
        ),
        Ok(None) => respond::failure(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => respond::from_error(&e),
    }
}

/// POST /users/{id}/follow
async fn handle_follow(
    req: Request<Incoming>,
    state: Arc<AppState>,
    user_id: ObjectId,
) -> Response<BoxBody> {
    let principal = match authenticate(&req, &state) {
        Ok(p) => p,
        Err(e) => return respond::from_error(&e),
    };

    let body: FollowRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return respond::from_error(&e),
    };

    let target = match parse_id(&body.target_user_id) {
        Ok(id) => id,
        Err(e) => return respond::from_error(&e),
    };

    let outcome = match state.graph.toggle_follow(&principal, user_id, target).await {
        Ok(o) => o,
        Err(e) => return respond::from_error(&e),
    };

    let message = match outcome {
        FollowOutcome::Followed => {
            // Inbox entry for the target; the edge is already durable, so a
            // failed append only loses the notice
            if let Ok(Some(actor)) = state.store.find_user(user_id).await {
                let note =
                    NotificationEntry::new(format!("@{} started following you", actor.username));
                if let Err(e) = state.store.push_notification(target, note).await {
                    warn!("Failed to push follow notification: {}", e);
                }
            }
            "User followed successfully"
        }
        FollowOutcome::Unfollowed => "User unfollowed successfully",
    };

    respond::success(StatusCode::OK, message, outcome)
}

/// GET /users/{id}/followers and /users/{id}/following
async fn handle_edge_listing(
    state: Arc<AppState>,
    user_id: ObjectId,
    list_type: &str,
) -> Response<BoxBody> {
    let user = match state.store.find_user(user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => return respond::failure(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => return respond::from_error(&e),
    };

    let ids = if list_type == "followers" {
        &user.followers
    } else {
        &user.following
    };

    let mut entries: Vec<UserSummary> = Vec::with_capacity(ids.len());
    for id in ids {
        match state.store.find_user(*id).await {
            Ok(Some(u)) => entries.push(u.to_summary()),
            // A dangling reference is skipped, not fatal
            Ok(None) => {}
            Err(e) => return respond::from_error(&e),
        }
    }

    respond::success(
        StatusCode::OK,
        &format!("{} list retrieved successfully", capitalize(list_type)),
        entries,
    )
}

/// GET /users/{id}/notifications
async fn handle_get_notifications(
    req: Request<Incoming>,
    state: Arc<AppState>,
    user_id: ObjectId,
) -> Response<BoxBody> {
    let principal = match authenticate(&req, &state) {
        Ok(p) => p,
        Err(e) => return respond::from_error(&e),
    };

    if !principal.owns_or_admin(user_id) {
        return respond::failure(
            StatusCode::FORBIDDEN,
            "You are not authorized to view these notifications",
        );
    }

    match state.store.find_user(user_id).await {
        Ok(Some(user)) => {
            let views: Vec<_> = user.notifications.iter().map(|n| n.to_view()).collect();
            respond::success(StatusCode::OK, "Notifications retrieved successfully", views)
        }
        Ok(None) => respond::failure(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => respond::from_error(&e),
    }
}

/// POST /users/{id}/notifications/mark
async fn handle_mark_notifications(
    req: Request<Incoming>,
    state: Arc<AppState>,
    user_id: ObjectId,
) -> Response<BoxBody> {
    let principal = match authenticate(&req, &state) {
        Ok(p) => p,
        Err(e) => return respond::from_error(&e),
    };

    if !principal.owns_or_admin(user_id) {
        return respond::failure(
            StatusCode::FORBIDDEN,
            "You are not authorized to update these notifications",
        );
    }

    let body: MarkNotificationsRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return respond::from_error(&e),
    };

    let mut ids = Vec::with_capacity(body.notification_ids.len());
    for raw in &body.notification_ids {
        match parse_id(raw) {
            Ok(id) => ids.push(id),
            Err(e) => return respond::from_error(&e),
        }
    }

    match state.store.mark_notifications(user_id, &ids, body.is_read).await {
        Ok(true) => respond::success_message(
            StatusCode::OK,
            &format!(
                "Notifications marked as {} successfully",
                if body.is_read { "read" } else { "unread" }
            ),
        ),
        Ok(false) => respond::failure(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => respond::from_error(&e),
    }
}

/// GET /users/{id}/posts
async fn handle_user_posts(state: Arc<AppState>, user_id: ObjectId) -> Response<BoxBody> {
    match state.store.find_user(user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return respond::failure(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => return respond::from_error(&e),
    }

    match state.store.posts_by_author(user_id).await {
        Ok(posts) => {
            let views: Vec<PostView> = posts.iter().map(|p| p.to_view()).collect();
            respond::success(StatusCode::OK, "User posts retrieved successfully", views)
        }
        Err(e) => respond::from_error(&e),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Route /users/* requests. Returns None for paths outside this family.
pub async fn handle_user_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    if !path.starts_with("/users") {
        return None;
    }

    let path = path.split('?').next().unwrap_or(path).to_string();
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let method = req.method().clone();

    // Every user route requires authentication; anonymous profile reads go
    // through once they carry a token like everyone else
    if let Err(e) = authenticate(&req, &state) {
        return Some(respond::from_error(&e));
    }

    let segment_refs: Vec<&str> = segments.iter().map(String::as_str).collect();

    let response = match (&method, segment_refs.as_slice()) {
        (&Method::GET, ["users", id]) => match parse_id(id) {
            Ok(id) => handle_get_profile(state, id).await,
            Err(e) => respond::from_error(&e),
        },
        (&Method::PUT, ["users", id]) => match parse_id(id) {
            Ok(id) => handle_update_profile(req, state, id).await,
            Err(e) => respond::from_error(&e),
        },
        (&Method::POST, ["users", id, "follow"]) => match parse_id(id) {
            Ok(id) => handle_follow(req, state, id).await,
            Err(e) => respond::from_error(&e),
        },
        (&Method::GET, ["users", id, list @ ("followers" | "following")]) => match parse_id(id) {
            Ok(id) => handle_edge_listing(state, id, list).await,
            Err(e) => respond::from_error(&e),
        },
        (&Method::GET, ["users", id, "notifications"]) => match parse_id(id) {
            Ok(id) => handle_get_notifications(req, state, id).await,
            Err(e) => respond::from_error(&e),
        },
        (&Method::POST, ["users", id, "notifications", "mark"]) => match parse_id(id) {
            Ok(id) => handle_mark_notifications(req, state, id).await,
            Err(e) => respond::from_error(&e),
        },
        (&Method::GET, ["users", id, "posts"]) => match parse_id(id) {
            Ok(id) => handle_user_posts(state, id).await,
            Err(e) => respond::from_error(&e),
        },

        (_, ["users", ..]) => method_not_allowed(),
        _ => respond::not_found(&path),
    };

    Some(response)
}
