//! Feed selection
//!
//! Two mutually exclusive modes, chosen only by whether the viewer follows
//! anyone:
//!
//! 1. Non-empty `following`: a pure chronological timeline of followed
//!    authors, newest first. No ranking score, no engagement weighting.
//! 2. Empty `following`: the cold-start fallback, posts from the trailing
//!    three-day window ordered by like count.
//!
//! Mode 1 never falls back to mode 2: a viewer whose followees have never
//! posted gets an empty feed. That is deliberate and load-bearing.

use bson::{oid::ObjectId, DateTime};
use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::db::schemas::PostDoc;
use crate::db::store::SocialStore;
use crate::types::{HuddleError, Result};

/// Maximum posts returned per feed request
pub const FEED_LIMIT: i64 = 50;

/// Trailing window for the cold-start discovery mode
pub const DISCOVERY_WINDOW_DAYS: i64 = 3;

/// Chooses which posts to surface for a viewer
pub struct FeedSelector {
    store: Arc<dyn SocialStore>,
}

impl FeedSelector {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Build the viewer's feed, at most [`FEED_LIMIT`] posts.
    pub async fn get_feed(&self, viewer: ObjectId) -> Result<Vec<PostDoc>> {
        let viewer = self
            .store
            .find_user(viewer)
            .await?
            .ok_or(HuddleError::NotFound("user"))?;

        if !viewer.following.is_empty() {
            return self
                .store
                .posts_by_authors_newest(&viewer.following, FEED_LIMIT)
                .await;
        }

        let cutoff = Utc::now() - Duration::days(DISCOVERY_WINDOW_DAYS);
        self.store
            .posts_since_by_likes(DateTime::from_chrono(cutoff), FEED_LIMIT)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::UserDoc;
    use crate::db::MemoryStore;

    async fn seed_user(store: &MemoryStore, username: &str) -> ObjectId {
        store
            .insert_user(UserDoc::new(
                username.to_uppercase(),
                username.to_string(),
                format!("{username}@example.com"),
                "$argon2id$fake".to_string(),
            ))
            .await
            .unwrap()
    }

    async fn seed_post(store: &MemoryStore, author: ObjectId, title: &str) -> ObjectId {
        store
            .insert_post(PostDoc::new(title.into(), "content".into(), author))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_timeline_mode_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let feed = FeedSelector::new(store.clone());

        let viewer = seed_user(&store, "viewer").await;
        let x = seed_user(&store, "x").await;
        let y = seed_user(&store, "y").await;
        let outsider = seed_user(&store, "outsider").await;

        store.add_following(viewer, x).await.unwrap();
        store.add_following(viewer, y).await.unwrap();

        let p1 = seed_post(&store, x, "x-first").await;
        store
            .backdate_post(p1, DateTime::from_millis(DateTime::now().timestamp_millis() - 3000))
            .await;
        let p2 = seed_post(&store, y, "y-first").await;
        store
            .backdate_post(p2, DateTime::from_millis(DateTime::now().timestamp_millis() - 2000))
            .await;
        let p3 = seed_post(&store, x, "x-second").await;
        seed_post(&store, outsider, "not-followed").await;

        let posts = feed.get_feed(viewer).await.unwrap();
        let ids: Vec<ObjectId> = posts.iter().map(|p| p._id.unwrap()).collect();
        assert_eq!(ids, vec![p3, p2, p1]);
    }

    #[tokio::test]
    async fn test_timeline_mode_ignores_engagement() {
        let store = Arc::new(MemoryStore::new());
        let feed = FeedSelector::new(store.clone());

        let viewer = seed_user(&store, "viewer").await;
        let x = seed_user(&store, "x").await;
        store.add_following(viewer, x).await.unwrap();

        let old_popular = seed_post(&store, x, "popular").await;
        store
            .backdate_post(
                old_popular,
                DateTime::from_millis(DateTime::now().timestamp_millis() - 5000),
            )
            .await;
        for _ in 0..10 {
            store.add_like(old_popular, ObjectId::new()).await.unwrap();
        }
        let fresh_quiet = seed_post(&store, x, "quiet").await;

        let posts = feed.get_feed(viewer).await.unwrap();
        // Chronological, not by engagement
        assert_eq!(posts[0]._id, Some(fresh_quiet));
        assert_eq!(posts[1]._id, Some(old_popular));
    }

    #[tokio::test]
    async fn test_discovery_mode_ranks_by_likes_within_window() {
        let store = Arc::new(MemoryStore::new());
        let feed = FeedSelector::new(store.clone());

        let viewer = seed_user(&store, "viewer").await;
        let author = seed_user(&store, "author").await;

        let quiet = seed_post(&store, author, "quiet").await;
        let popular = seed_post(&store, author, "popular").await;
        let middling = seed_post(&store, author, "middling").await;
        for _ in 0..5 {
            store.add_like(popular, ObjectId::new()).await.unwrap();
        }
        for _ in 0..2 {
            store.add_like(middling, ObjectId::new()).await.unwrap();
        }

        // A well-liked post outside the window must not appear
        let stale = seed_post(&store, author, "stale").await;
        for _ in 0..50 {
            store.add_like(stale, ObjectId::new()).await.unwrap();
        }
        let four_days_ms = 4 * 24 * 60 * 60 * 1000;
        store
            .backdate_post(
                stale,
                DateTime::from_millis(DateTime::now().timestamp_millis() - four_days_ms),
            )
            .await;

        let posts = feed.get_feed(viewer).await.unwrap();
        let ids: Vec<ObjectId> = posts.iter().map(|p| p._id.unwrap()).collect();
        assert_eq!(ids, vec![popular, middling, quiet]);
    }

    #[tokio::test]
    async fn test_discovery_mode_truncates_to_limit() {
        let store = Arc::new(MemoryStore::new());
        let feed = FeedSelector::new(store.clone());

        let viewer = seed_user(&store, "viewer").await;
        let author = seed_user(&store, "author").await;
        for i in 0..60 {
            seed_post(&store, author, &format!("post-{i}")).await;
        }

        let posts = feed.get_feed(viewer).await.unwrap();
        assert_eq!(posts.len(), FEED_LIMIT as usize);
    }

    #[tokio::test]
    async fn test_followed_but_silent_authors_yield_empty_feed() {
        let store = Arc::new(MemoryStore::new());
        let feed = FeedSelector::new(store.clone());

        let viewer = seed_user(&store, "viewer").await;
        let silent = seed_user(&store, "silent").await;
        store.add_following(viewer, silent).await.unwrap();

        // Plenty of recent, popular content from users the viewer does NOT
        // follow; mode 1 must not fall back to it
        let author = seed_user(&store, "author").await;
        let popular = seed_post(&store, author, "popular").await;
        for _ in 0..10 {
            store.add_like(popular, ObjectId::new()).await.unwrap();
        }

        let posts = feed.get_feed(viewer).await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_missing_viewer_not_found() {
        let store = Arc::new(MemoryStore::new());
        let feed = FeedSelector::new(store.clone());

        let err = feed.get_feed(ObjectId::new()).await.unwrap_err();
        assert!(matches!(err, HuddleError::NotFound(_)));
    }
}
