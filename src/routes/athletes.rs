//! HTTP routes for the principal's athlete profile
//!
//! - POST   /athletes - Create the profile (one per user)
//! - GET    /athletes - Retrieve it
//! - PUT    /athletes - Allow-listed update (name, stats)
//! - DELETE /athletes - Delete it and clear the user's reference
//!
//! The stats body is an open map of stat name to number/string/boolean;
//! any other value shape fails deserialization and is rejected.

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::auth::Principal;
use crate::db::schemas::{AthleteDoc, StatValue, UserDoc};
use crate::db::store::AthleteChanges;
use crate::routes::respond::{
    self, authenticate, method_not_allowed, parse_json_body, BoxBody,
};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateAthleteRequest {
    pub name: Option<String>,
    pub stats: Option<HashMap<String, StatValue>>,
}

async fn load_user(state: &AppState, principal: &Principal) -> Result<UserDoc, Response<BoxBody>> {
    match state.store.find_user(principal.id).await {
        Ok(Some(u)) => Ok(u),
        Ok(None) => Err(respond::failure(StatusCode::NOT_FOUND, "User not found")),
        Err(e) => Err(respond::from_error(&e)),
    }
}

/// POST /athletes
async fn handle_create(
    req: Request<Incoming>,
    state: Arc<AppState>,
    principal: Principal,
) -> Response<BoxBody> {
    // The whole body is the stat map
    let stats: HashMap<String, StatValue> = match parse_json_body(req).await {
        Ok(s) => s,
        Err(e) => return respond::from_error(&e),
    };

    let user = match load_user(&state, &principal).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    if user.athlete_profile.is_some() {
        return respond::failure(
            StatusCode::BAD_REQUEST,
            "User already has an athlete profile",
        );
    }

    let athlete = AthleteDoc::new(user.name.clone(), stats);
    let athlete_id = match state.store.insert_athlete(athlete).await {
        Ok(id) => id,
        Err(e) => return respond::from_error(&e),
    };

    if let Err(e) = state
        .store
        .set_athlete_profile(principal.id, Some(athlete_id))
        .await
    {
        // The profile document exists but the user does not point at it;
        // reclaim it so a retry is clean
        if let Err(undo) = state.store.delete_athlete(athlete_id).await {
            warn!("Failed to reclaim orphaned athlete profile: {}", undo);
        }
        return respond::from_error(&e);
    }

    match state.store.find_athlete(athlete_id).await {
        Ok(Some(athlete)) => respond::success(
            StatusCode::CREATED,
            "Athlete profile created successfully",
            athlete.to_view(),
        ),
        Ok(None) => respond::failure(StatusCode::INTERNAL_SERVER_ERROR, "Profile vanished"),
        Err(e) => respond::from_error(&e),
    }
}

/// GET /athletes
async fn handle_get(state: Arc<AppState>, principal: Principal) -> Response<BoxBody> {
    let user = match load_user(&state, &principal).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    let Some(athlete_id) = user.athlete_profile else {
        return respond::failure(StatusCode::NOT_FOUND, "Athlete profile not found");
    };

    match state.store.find_athlete(athlete_id).await {
        Ok(Some(athlete)) => respond::success(
            StatusCode::OK,
            "Athlete profile retrieved successfully",
            athlete.to_view(),
        ),
        Ok(None) => respond::failure(StatusCode::NOT_FOUND, "Athlete profile not found"),
        Err(e) => respond::from_error(&e),
    }
}

/// PUT /athletes
async fn handle_update(
    req: Request<Incoming>,
    state: Arc<AppState>,
    principal: Principal,
) -> Response<BoxBody> {
    let body: UpdateAthleteRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return respond::from_error(&e),
    };

    let changes = AthleteChanges {
        name: body.name,
        stats: body.stats,
    };
    if changes.is_empty() {
        return respond::failure(StatusCode::BAD_REQUEST, "No updatable fields provided");
    }

    let user = match load_user(&state, &principal).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    let Some(athlete_id) = user.athlete_profile else {
        return respond::failure(StatusCode::NOT_FOUND, "Athlete profile not found");
    };

    match state.store.update_athlete(athlete_id, changes).await {
        Ok(true) => {}
        Ok(false) => return respond::failure(StatusCode::NOT_FOUND, "Athlete profile not found"),
        Err(e) => return respond::from_error(&e),
    }

    match state.store.find_athlete(athlete_id).await {
        Ok(Some(athlete)) => respond::success(
            StatusCode::OK,
            "Athlete profile updated successfully",
            athlete.to_view(),
        ),
        Ok(None) => respond::failure(StatusCode::NOT_FOUND, "Athlete profile not found"),
        Err(e) => respond::from_error(&e),
    }
}

/// DELETE /athletes
async fn handle_delete(state: Arc<AppState>, principal: Principal) -> Response<BoxBody> {
    let user = match load_user(&state, &principal).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    let Some(athlete_id) = user.athlete_profile else {
        return respond::failure(StatusCode::NOT_FOUND, "Athlete profile not found");
    };

    if let Err(e) = state.store.delete_athlete(athlete_id).await {
        return respond::from_error(&e);
    }

    match state.store.set_athlete_profile(principal.id, None).await {
        Ok(_) => respond::success_message(StatusCode::OK, "Athlete profile deleted successfully"),
        Err(e) => respond::from_error(&e),
    }
}

/// Route /athletes requests. Returns None for paths outside this family.
pub async fn handle_athlete_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    let path = path.split('?').next().unwrap_or(path);
    if path != "/athletes" && path != "/athletes/" {
        if !path.starts_with("/athletes") {
            return None;
        }
        return Some(respond::not_found(path));
    }

    let principal = match authenticate(&req, &state) {
        Ok(p) => p,
        Err(e) => return Some(respond::from_error(&e)),
    };

    let method = req.method().clone();
    let response = match method {
        Method::POST => handle_create(req, state, principal).await,
        Method::GET => handle_get(state, principal).await,
        Method::PUT => handle_update(req, state, principal).await,
        Method::DELETE => handle_delete(state, principal).await,
        _ => method_not_allowed(),
    };

    Some(response)
}
