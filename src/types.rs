//! Error types shared across Huddle
//!
//! One enum covers both the core taxonomy (what the graph, engagement and
//! feed components report) and the ambient failures of the surrounding
//! service (auth, transport, configuration). Route handlers map each
//! variant to an HTTP status; see `routes::respond`.

use thiserror::Error;

/// Unified error type for Huddle
#[derive(Error, Debug)]
pub enum HuddleError {
    /// A referenced user, post or comment does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The actor is not the resource owner and lacks admin
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The actor targeted itself where that is disallowed
    #[error("operation may not target the acting user")]
    SelfReference,

    /// Malformed identifiers or rejected input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Underlying persistence failure, not further categorized
    #[error("store error: {0}")]
    Store(String),

    /// Authentication or token failure
    #[error("auth error: {0}")]
    Auth(String),

    /// Transport-level failure (bad body, oversized payload)
    #[error("http error: {0}")]
    Http(String),

    /// Invalid or incomplete configuration
    #[error("config error: {0}")]
    Config(String),
}

impl From<mongodb::error::Error> for HuddleError {
    fn from(e: mongodb::error::Error) -> Self {
        HuddleError::Store(e.to_string())
    }
}

impl From<std::io::Error> for HuddleError {
    fn from(e: std::io::Error) -> Self {
        HuddleError::Store(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HuddleError>;
