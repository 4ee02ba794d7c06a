//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. One accept loop, one
//! task per connection, and a central dispatcher that hands requests to
//! the route families.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::db::store::SocialStore;
use crate::engagement::EngagementManager;
use crate::feed::FeedSelector;
use crate::graph::SocialGraphManager;
use crate::routes;
use crate::routes::respond::{self, BoxBody};
use crate::types::HuddleError;

/// Shared application state
///
/// The store handle is constructed once at startup and handed to each
/// component here; nothing holds connection state at module level.
pub struct AppState {
    pub args: Args,
    pub store: Arc<dyn SocialStore>,
    pub graph: SocialGraphManager,
    pub engagement: EngagementManager,
    pub feed: FeedSelector,
    pub jwt: JwtValidator,
}

impl AppState {
    pub fn new(args: Args, store: Arc<dyn SocialStore>) -> Self {
        let jwt = JwtValidator::new(args.jwt_secret(), args.jwt_expiry_seconds);
        Self {
            graph: SocialGraphManager::new(Arc::clone(&store)),
            engagement: EngagementManager::new(Arc::clone(&store)),
            feed: FeedSelector::new(Arc::clone(&store)),
            store,
            jwt,
            args,
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), HuddleError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Huddle listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("[{}] {} {}", addr, method, path);

    // CORS preflight
    if method == Method::OPTIONS {
        return Ok(respond::cors_preflight());
    }

    // Probes
    match (&method, path.as_str()) {
        (&Method::GET, "/health") | (&Method::GET, "/healthz") => {
            return Ok(routes::health_check(&state));
        }
        (&Method::GET, "/version") => {
            return Ok(routes::version_info());
        }
        _ => {}
    }

    // Route families, each consuming the request when its prefix matches
    if path.starts_with("/auth") {
        if let Some(response) = routes::handle_auth_request(req, Arc::clone(&state)).await {
            return Ok(response);
        }
        return Ok(respond::not_found(&path));
    }

    if path.starts_with("/users") {
        if let Some(response) = routes::handle_user_request(req, Arc::clone(&state)).await {
            return Ok(response);
        }
        return Ok(respond::not_found(&path));
    }

    if path.starts_with("/posts") {
        if let Some(response) = routes::handle_post_request(req, Arc::clone(&state)).await {
            return Ok(response);
        }
        return Ok(respond::not_found(&path));
    }

    if path.starts_with("/feed") {
        if let Some(response) = routes::handle_feed_request(req, Arc::clone(&state)).await {
            return Ok(response);
        }
        return Ok(respond::not_found(&path));
    }

    if path.starts_with("/athletes") {
        if let Some(response) = routes::handle_athlete_request(req, Arc::clone(&state)).await {
            return Ok(response);
        }
        return Ok(respond::not_found(&path));
    }

    Ok(respond::not_found(&path))
}
