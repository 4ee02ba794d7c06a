//! HTTP routes for authentication
//!
//! - POST /auth/register - Create an account and get a JWT token
//! - POST /auth/login    - Authenticate and get a JWT token
//! - GET  /auth/me       - Get the current user from a token

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::hash_password;
use crate::auth::verify_password;
use crate::db::schemas::{UserDoc, UserProfile};
use crate::routes::respond::{
    self, authenticate, method_not_allowed, parse_json_body, BoxBody,
};
use crate::server::AppState;
use crate::validate;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: u64,
    pub user: UserProfile,
}

/// POST /auth/register
async fn handle_register(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let body: RegisterRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return respond::from_error(&e),
    };

    let username = body.username.trim().to_string();
    let name = match validate::non_empty("name", &body.name) {
        Ok(n) => n,
        Err(e) => return respond::failure(StatusCode::BAD_REQUEST, &e),
    };
    let email = body.email.trim().to_lowercase();
    if !email.contains('@') {
        return respond::failure(StatusCode::BAD_REQUEST, "Invalid email address");
    }

    let username_violations = validate::validate_username(&username);
    if !username_violations.is_empty() {
        return respond::failure_detail(
            StatusCode::BAD_REQUEST,
            "Invalid username",
            username_violations,
        );
    }

    let password_violations = validate::validate_password(&body.password);
    if !password_violations.is_empty() {
        return respond::failure_detail(
            StatusCode::BAD_REQUEST,
            "Invalid password",
            password_violations,
        );
    }

    info!("Creating new user: @{}", username);

    match state.store.find_user_by_username(&username).await {
        Ok(Some(_)) => return respond::failure(StatusCode::BAD_REQUEST, "Username already exists"),
        Ok(None) => {}
        Err(e) => return respond::from_error(&e),
    }

    match state.store.find_user_by_email(&email).await {
        Ok(Some(_)) => return respond::failure(StatusCode::BAD_REQUEST, "Email already exists"),
        Ok(None) => {}
        Err(e) => return respond::from_error(&e),
    }

    let password_hash = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => return respond::from_error(&e),
    };

    let user = UserDoc::new(name, username, email, password_hash);
    let id = match state.store.insert_user(user).await {
        Ok(id) => id,
        Err(e) => return respond::from_error(&e),
    };

    let created = match state.store.find_user(id).await {
        Ok(Some(u)) => u,
        Ok(None) => return respond::failure(StatusCode::INTERNAL_SERVER_ERROR, "User vanished"),
        Err(e) => return respond::from_error(&e),
    };

    let (token, expires_at) = match state.jwt.generate_token(&id.to_hex(), created.role) {
        Ok(t) => t,
        Err(e) => return respond::from_error(&e),
    };

    respond::success(
        StatusCode::CREATED,
        "User created successfully",
        AuthResponse {
            token,
            expires_at,
            user: created.to_profile(),
        },
    )
}

/// POST /auth/login
async fn handle_login(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let body: LoginRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return respond::from_error(&e),
    };

    if body.identifier.is_empty() || body.password.is_empty() {
        return respond::failure(
            StatusCode::BAD_REQUEST,
            "Missing required fields: identifier, password",
        );
    }

    // Username first, then email; one generic error for every miss so
    // accounts cannot be enumerated
    let lookup = match state.store.find_user_by_username(&body.identifier).await {
        Ok(Some(u)) => Ok(Some(u)),
        Ok(None) => state.store.find_user_by_email(&body.identifier).await,
        Err(e) => Err(e),
    };

    let user = match lookup {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!("Login failed - user not found: {}", body.identifier);
            return respond::failure(StatusCode::UNAUTHORIZED, "Invalid credentials");
        }
        Err(e) => return respond::from_error(&e),
    };

    let password_valid = match verify_password(&body.password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            warn!("Password verification error: {}", e);
            return respond::failure(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error");
        }
    };

    if !password_valid {
        warn!("Login failed - invalid password: {}", body.identifier);
        return respond::failure(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let id = match user._id {
        Some(id) => id,
        None => return respond::failure(StatusCode::INTERNAL_SERVER_ERROR, "User has no id"),
    };

    let (token, expires_at) = match state.jwt.generate_token(&id.to_hex(), user.role) {
        Ok(t) => t,
        Err(e) => return respond::from_error(&e),
    };

    info!("Login successful: {}", user.username);

    respond::success(
        StatusCode::OK,
        "Login successful",
        AuthResponse {
            token,
            expires_at,
            user: user.to_profile(),
        },
    )
}

/// GET /auth/me
async fn handle_me(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let principal = match authenticate(&req, &state) {
        Ok(p) => p,
        Err(e) => return respond::from_error(&e),
    };

    match state.store.find_user(principal.id).await {
        Ok(Some(user)) => respond::success(
            StatusCode::OK,
            "User profile retrieved successfully",
            user.to_profile(),
        ),
        Ok(None) => respond::failure(StatusCode::UNAUTHORIZED, "User not found"),
        Err(e) => respond::from_error(&e),
    }
}

/// Route /auth/* requests. Returns None for paths outside this family.
pub async fn handle_auth_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Option<Response<BoxBody>> {
    let path = req.uri().path();
    if !path.starts_with("/auth") {
        return None;
    }

    let path = path.split('?').next().unwrap_or(path).to_string();
    let method = req.method().clone();

    let response = match (method, path.as_str()) {
        (Method::POST, "/auth/register") => handle_register(req, state).await,
        (Method::POST, "/auth/login") => handle_login(req, state).await,
        (Method::GET, "/auth/me") => handle_me(req, state).await,

        (_, "/auth/register") | (_, "/auth/login") | (_, "/auth/me") => method_not_allowed(),

        _ => respond::not_found(&path),
    };

    Some(response)
}
