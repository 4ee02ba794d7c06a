//! Huddle - social networking REST backend for athletes
//!
//! User accounts, posts with likes/comments/shares, follow graphs, athlete
//! stat profiles, notifications, and a two-mode feed.
//!
//! ## Components
//!
//! - **Social graph** (`graph`): paired follow/follower edge mutation
//! - **Engagement** (`engagement`): likes and comments with ownership checks
//! - **Feed** (`feed`): timeline of followed authors, or trailing-window
//!   discovery ranking for viewers with no social graph
//! - **Store** (`db`): MongoDB in production, in-memory in dev mode

pub mod auth;
pub mod config;
pub mod db;
pub mod engagement;
pub mod feed;
pub mod graph;
pub mod routes;
pub mod server;
pub mod types;
pub mod validate;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{HuddleError, Result};
