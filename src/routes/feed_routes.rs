//! HTTP route for the feed
//!
//! - GET /feed - The viewer's feed: followed authors newest-first, or the
//!   trailing-window discovery ranking when the viewer follows nobody.

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use crate::db::schemas::PostView;
use crate::routes::respond::{self, authenticate, method_not_allowed, BoxBody};
use crate::server::AppState;

/// Route /feed requests. Returns None for paths outside this family.
pub async fn handle_feed_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let path = path.split('?').next().unwrap_or(path);
    if path != "/feed" {
        return None;
    }

    if req.method() != Method::GET {
        return Some(method_not_allowed());
    }

    let principal = match authenticate(&req, &state) {
        Ok(p) => p,
        Err(e) => return Some(respond::from_error(&e)),
    };

    let response = match state.feed.get_feed(principal.id).await {
        Ok(posts) => {
            let views: Vec<PostView> = posts.iter().map(|p| p.to_view()).collect();
            respond::success(StatusCode::OK, "Feed retrieved successfully", views)
        }
        Err(e) => respond::from_error(&e),
    };

    Some(response)
}
