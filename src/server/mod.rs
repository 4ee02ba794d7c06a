//! HTTP server for Huddle

pub mod http;

pub use http::{run, AppState};
