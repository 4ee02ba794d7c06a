//! Health check endpoints
//!
//! - /health, /healthz - Liveness probe
//! - /version          - Version info for deployment verification

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::respond::{self, BoxBody};
use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub mode: &'static str,
    pub node_id: String,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

/// GET /health
pub fn health_check(state: &AppState) -> Response<BoxBody> {
    respond::success(
        StatusCode::OK,
        "ok",
        HealthResponse {
            healthy: true,
            version: env!("CARGO_PKG_VERSION"),
            mode: if state.args.dev_mode {
                "development"
            } else {
                "production"
            },
            node_id: state.args.node_id.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    )
}

/// GET /version
pub fn version_info() -> Response<BoxBody> {
    respond::success(
        StatusCode::OK,
        "ok",
        VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}
