//! Database schemas for Huddle
//!
//! Defines the document structures for users, posts and athlete profiles.

mod athlete;
mod metadata;
mod post;
mod user;

pub use athlete::{AthleteDoc, AthleteView, StatValue, ATHLETE_COLLECTION};
pub use metadata::Metadata;
pub use post::{CommentEntry, CommentView, PostDoc, PostView, POST_COLLECTION};
pub use user::{
    NotificationEntry, NotificationView, SocialLinks, UserDoc, UserProfile, UserSummary,
    USER_COLLECTION,
};
