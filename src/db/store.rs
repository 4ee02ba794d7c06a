//! The document-store contract the core components are built against
//!
//! Components receive an `Arc<dyn SocialStore>` at construction time; there
//! is no module-level connection state. Membership operations map to the
//! store's atomic set primitives and report whether the document actually
//! changed, so toggles and compensating writes never need to read-modify-
//! write a whole array.
//!
//! Two implementations exist: `MongoStore` for production and
//! `MemoryStore` for dev mode and tests.

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use std::collections::HashMap;

use crate::db::schemas::{
    AthleteDoc, CommentEntry, NotificationEntry, PostDoc, SocialLinks, StatValue, UserDoc,
};
use crate::types::Result;

/// Allow-listed user profile fields. Unknown keys are rejected at the HTTP
/// boundary; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub social_links: Option<SocialLinks>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.bio.is_none()
            && self.avatar.is_none()
            && self.social_links.is_none()
    }
}

/// Allow-listed athlete profile fields
#[derive(Debug, Clone, Default)]
pub struct AthleteChanges {
    pub name: Option<String>,
    pub stats: Option<HashMap<String, StatValue>>,
}

impl AthleteChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.stats.is_none()
    }
}

/// Durable document store reachable by primary key and the two feed query
/// shapes. All mutations are atomic per document.
#[async_trait]
pub trait SocialStore: Send + Sync {
    // ---- users ----

    async fn insert_user(&self, user: UserDoc) -> Result<ObjectId>;
    async fn find_user(&self, id: ObjectId) -> Result<Option<UserDoc>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserDoc>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>>;

    /// Apply allow-listed profile changes. Returns false when the user does
    /// not exist.
    async fn update_user_profile(&self, id: ObjectId, changes: ProfileChanges) -> Result<bool>;

    // ---- follow graph (single-side halves; pairing is the graph
    // component's job) ----

    /// Add `target` to `user.following`. Returns true when membership changed.
    async fn add_following(&self, user: ObjectId, target: ObjectId) -> Result<bool>;
    /// Remove `target` from `user.following`. Returns true when membership changed.
    async fn remove_following(&self, user: ObjectId, target: ObjectId) -> Result<bool>;
    /// Add `follower` to `user.followers`. Returns true when membership changed.
    async fn add_follower(&self, user: ObjectId, follower: ObjectId) -> Result<bool>;
    /// Remove `follower` from `user.followers`. Returns true when membership changed.
    async fn remove_follower(&self, user: ObjectId, follower: ObjectId) -> Result<bool>;

    // ---- notifications ----

    /// Append to the user's inbox. Returns false when the user does not exist.
    async fn push_notification(&self, user: ObjectId, entry: NotificationEntry) -> Result<bool>;
    /// Mark the listed notification ids read or unread.
    async fn mark_notifications(
        &self,
        user: ObjectId,
        ids: &[ObjectId],
        is_read: bool,
    ) -> Result<bool>;

    // ---- posts ----

    async fn insert_post(&self, post: PostDoc) -> Result<ObjectId>;
    async fn find_post(&self, id: ObjectId) -> Result<Option<PostDoc>>;
    /// Replace title and content. Returns false when the post does not exist.
    async fn update_post_body(&self, id: ObjectId, title: &str, content: &str) -> Result<bool>;
    /// Delete a post. Returns false when the post does not exist.
    async fn delete_post(&self, id: ObjectId) -> Result<bool>;
    /// All posts authored by one user, newest first.
    async fn posts_by_author(&self, author: ObjectId) -> Result<Vec<PostDoc>>;

    // ---- engagement membership ----

    /// Add `user` to the post's like set. Returns true when membership changed.
    async fn add_like(&self, post: ObjectId, user: ObjectId) -> Result<bool>;
    /// Remove `user` from the post's like set. Returns true when membership changed.
    async fn remove_like(&self, post: ObjectId, user: ObjectId) -> Result<bool>;
    /// Append a comment. Returns false when the post does not exist.
    async fn push_comment(&self, post: ObjectId, comment: CommentEntry) -> Result<bool>;
    /// Remove one comment by id, preserving the order of the remainder.
    /// Returns true when a comment was removed.
    async fn pull_comment(&self, post: ObjectId, comment: ObjectId) -> Result<bool>;

    // ---- feed query shapes ----

    /// Posts whose author is in `authors`, creation time descending, at most
    /// `limit`.
    async fn posts_by_authors_newest(
        &self,
        authors: &[ObjectId],
        limit: i64,
    ) -> Result<Vec<PostDoc>>;

    /// Posts created at or after `cutoff`, like-count descending (ties keep
    /// store order), at most `limit`.
    async fn posts_since_by_likes(&self, cutoff: DateTime, limit: i64) -> Result<Vec<PostDoc>>;

    // ---- athletes ----

    async fn insert_athlete(&self, athlete: AthleteDoc) -> Result<ObjectId>;
    async fn find_athlete(&self, id: ObjectId) -> Result<Option<AthleteDoc>>;
    /// Apply allow-listed athlete changes. Returns false when absent.
    async fn update_athlete(&self, id: ObjectId, changes: AthleteChanges) -> Result<bool>;
    /// Delete an athlete profile. Returns false when absent.
    async fn delete_athlete(&self, id: ObjectId) -> Result<bool>;
    /// Point the user's `athlete_profile` reference (or clear it with None).
    async fn set_athlete_profile(&self, user: ObjectId, profile: Option<ObjectId>)
        -> Result<bool>;
}
