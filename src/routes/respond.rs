//! Shared response envelope and request helpers
//!
//! Every endpoint answers with the same JSON envelope:
//! `{ "success": true, "message": ..., "data": ... }` on success and
//! `{ "success": false, "message": ..., "error": ... }` on failure.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::auth::{extract_token_from_header, Principal};
use crate::server::AppState;
use crate::types::HuddleError;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Serialize)]
struct SuccessEnvelope<'a, T: Serialize> {
    success: bool,
    message: &'a str,
    data: T,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a, T: Serialize> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<T>,
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(full_body(json))
        .unwrap()
}

/// Success envelope with payload
pub fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response<BoxBody> {
    json_response(
        status,
        &SuccessEnvelope {
            success: true,
            message,
            data,
        },
    )
}

/// Success envelope without payload
pub fn success_message(status: StatusCode, message: &str) -> Response<BoxBody> {
    success(status, message, serde_json::Map::new())
}

/// Error envelope without detail
pub fn failure(status: StatusCode, message: &str) -> Response<BoxBody> {
    json_response(
        status,
        &ErrorEnvelope::<()> {
            success: false,
            message,
            error: None,
        },
    )
}

/// Error envelope with a detail payload (e.g. a list of violated rules)
pub fn failure_detail<T: Serialize>(
    status: StatusCode,
    message: &str,
    error: T,
) -> Response<BoxBody> {
    json_response(
        status,
        &ErrorEnvelope {
            success: false,
            message,
            error: Some(error),
        },
    )
}

/// Map a `HuddleError` onto the envelope with the right status code
pub fn from_error(err: &HuddleError) -> Response<BoxBody> {
    let status = match err {
        HuddleError::NotFound(_) => StatusCode::NOT_FOUND,
        HuddleError::Forbidden(_) => StatusCode::FORBIDDEN,
        HuddleError::SelfReference => StatusCode::BAD_REQUEST,
        HuddleError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        HuddleError::Http(_) => StatusCode::BAD_REQUEST,
        HuddleError::Auth(_) => StatusCode::UNAUTHORIZED,
        HuddleError::Store(_) | HuddleError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    failure(status, &err.to_string())
}

/// CORS preflight response
pub fn cors_preflight() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap()
}

pub fn not_found(path: &str) -> Response<BoxBody> {
    failure(StatusCode::NOT_FOUND, &format!("No route for {}", path))
}

pub fn method_not_allowed() -> Response<BoxBody> {
    failure(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

/// Read and deserialize a JSON request body
pub async fn parse_json_body<T: for<'de> Deserialize<'de>>(
    req: Request<Incoming>,
) -> Result<T, HuddleError> {
    let body = req
        .collect()
        .await
        .map_err(|e| HuddleError::Http(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > MAX_BODY_BYTES {
        return Err(HuddleError::Http("Request body too large".into()));
    }

    serde_json::from_slice(&bytes).map_err(|e| HuddleError::Http(format!("Invalid JSON: {}", e)))
}

/// Resolve the authenticated principal from the bearer token
pub fn authenticate(req: &Request<Incoming>, state: &AppState) -> Result<Principal, HuddleError> {
    let header = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HuddleError::Auth("No token, authorization denied".into()))?;

    let token = extract_token_from_header(header)
        .ok_or_else(|| HuddleError::Auth("Malformed authorization header".into()))?;

    let claims = state.jwt.verify_token(token)?;
    let id = bson::oid::ObjectId::parse_str(&claims.sub)
        .map_err(|_| HuddleError::Auth("Token subject is not a valid id".into()))?;

    Ok(Principal::new(id, claims.role))
}

/// Parse a path segment as an ObjectId
pub fn parse_id(segment: &str) -> Result<bson::oid::ObjectId, HuddleError> {
    bson::oid::ObjectId::parse_str(segment)
        .map_err(|_| HuddleError::InvalidInput(format!("invalid id: {}", segment)))
}
