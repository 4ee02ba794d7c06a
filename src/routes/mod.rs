//! HTTP routes for Huddle

pub mod athletes;
pub mod auth_routes;
pub mod feed_routes;
pub mod health;
pub mod posts;
pub mod respond;
pub mod users;

pub use athletes::handle_athlete_request;
pub use auth_routes::handle_auth_request;
pub use feed_routes::handle_feed_request;
pub use health::{health_check, version_info};
pub use posts::handle_post_request;
pub use users::handle_user_request;
