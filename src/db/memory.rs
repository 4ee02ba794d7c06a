//! In-memory implementation of the `SocialStore` contract
//!
//! Serves dev mode (running without MongoDB) and the component tests. Each
//! operation takes the write lock for its whole read-modify-write, which
//! makes every membership mutation atomic. Posts live in a Vec so "store
//! order" means insertion order, matching the tie-break behavior the feed
//! contract leaves to the backend.

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::db::schemas::{AthleteDoc, CommentEntry, NotificationEntry, PostDoc, UserDoc};
use crate::db::store::{AthleteChanges, ProfileChanges, SocialStore};
use crate::types::Result;

/// Dev/test store backed by process memory
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<ObjectId, UserDoc>>,
    posts: RwLock<Vec<PostDoc>>,
    athletes: RwLock<HashMap<ObjectId, AthleteDoc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Test support: rewrite a post's creation time
    pub async fn backdate_post(&self, id: ObjectId, created_at: DateTime) {
        let mut posts = self.posts.write().await;
        if let Some(post) = posts.iter_mut().find(|p| p._id == Some(id)) {
            post.metadata.created_at = Some(created_at);
        }
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn insert_user(&self, mut user: UserDoc) -> Result<ObjectId> {
        let id = ObjectId::new();
        user._id = Some(id);
        user.metadata.stamp_new();
        self.users.write().await.insert(id, user);
        Ok(id)
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<UserDoc>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserDoc>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user_profile(&self, id: ObjectId, changes: ProfileChanges) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Ok(false);
        };

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(bio) = changes.bio {
            user.bio = Some(bio);
        }
        if let Some(avatar) = changes.avatar {
            user.avatar = avatar;
        }
        if let Some(links) = changes.social_links {
            user.social_links = links;
        }
        user.metadata.touch();
        Ok(true)
    }

    async fn add_following(&self, user: ObjectId, target: ObjectId) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&user) else {
            return Ok(false);
        };
        if user.following.contains(&target) {
            return Ok(false);
        }
        user.following.push(target);
        Ok(true)
    }

    async fn remove_following(&self, user: ObjectId, target: ObjectId) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&user) else {
            return Ok(false);
        };
        let before = user.following.len();
        user.following.retain(|id| *id != target);
        Ok(user.following.len() != before)
    }

    async fn add_follower(&self, user: ObjectId, follower: ObjectId) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&user) else {
            return Ok(false);
        };
        if user.followers.contains(&follower) {
            return Ok(false);
        }
        user.followers.push(follower);
        Ok(true)
    }

    async fn remove_follower(&self, user: ObjectId, follower: ObjectId) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&user) else {
            return Ok(false);
        };
        let before = user.followers.len();
        user.followers.retain(|id| *id != follower);
        Ok(user.followers.len() != before)
    }

    async fn push_notification(&self, user: ObjectId, entry: NotificationEntry) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&user) else {
            return Ok(false);
        };
        user.notifications.push(entry);
        Ok(true)
    }

    async fn mark_notifications(
        &self,
        user: ObjectId,
        ids: &[ObjectId],
        is_read: bool,
    ) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&user) else {
            return Ok(false);
        };
        for entry in user.notifications.iter_mut() {
            if ids.contains(&entry._id) {
                entry.is_read = is_read;
            }
        }
        Ok(true)
    }

    async fn insert_post(&self, mut post: PostDoc) -> Result<ObjectId> {
        let id = ObjectId::new();
        post._id = Some(id);
        post.metadata.stamp_new();
        self.posts.write().await.push(post);
        Ok(id)
    }

    async fn find_post(&self, id: ObjectId) -> Result<Option<PostDoc>> {
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .find(|p| p._id == Some(id))
            .cloned())
    }

    async fn update_post_body(&self, id: ObjectId, title: &str, content: &str) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p._id == Some(id)) else {
            return Ok(false);
        };
        post.title = title.to_string();
        post.content = content.to_string();
        post.metadata.touch();
        Ok(true)
    }

    async fn delete_post(&self, id: ObjectId) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p._id != Some(id));
        Ok(posts.len() != before)
    }

    async fn posts_by_author(&self, author: ObjectId) -> Result<Vec<PostDoc>> {
        let mut posts: Vec<PostDoc> = self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.author == author)
            .cloned()
            .collect();
        posts.sort_by_key(|p| std::cmp::Reverse(p.metadata.created_at.unwrap_or(DateTime::MIN)));
        Ok(posts)
    }

    async fn add_like(&self, post: ObjectId, user: ObjectId) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p._id == Some(post)) else {
            return Ok(false);
        };
        if post.likes.contains(&user) {
            return Ok(false);
        }
        post.likes.push(user);
        Ok(true)
    }

    async fn remove_like(&self, post: ObjectId, user: ObjectId) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p._id == Some(post)) else {
            return Ok(false);
        };
        let before = post.likes.len();
        post.likes.retain(|id| *id != user);
        Ok(post.likes.len() != before)
    }

    async fn push_comment(&self, post: ObjectId, comment: CommentEntry) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p._id == Some(post)) else {
            return Ok(false);
        };
        post.comments.push(comment);
        Ok(true)
    }

    async fn pull_comment(&self, post: ObjectId, comment: ObjectId) -> Result<bool> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p._id == Some(post)) else {
            return Ok(false);
        };
        let before = post.comments.len();
        post.comments.retain(|c| c._id != comment);
        Ok(post.comments.len() != before)
    }

    async fn posts_by_authors_newest(
        &self,
        authors: &[ObjectId],
        limit: i64,
    ) -> Result<Vec<PostDoc>> {
        let mut posts: Vec<PostDoc> = self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| authors.contains(&p.author))
            .cloned()
            .collect();
        posts.sort_by_key(|p| std::cmp::Reverse(p.metadata.created_at.unwrap_or(DateTime::MIN)));
        posts.truncate(limit.max(0) as usize);
        Ok(posts)
    }

    async fn posts_since_by_likes(&self, cutoff: DateTime, limit: i64) -> Result<Vec<PostDoc>> {
        let mut posts: Vec<PostDoc> = self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| p.metadata.created_at.unwrap_or(DateTime::MIN) >= cutoff)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal like counts
        posts.sort_by_key(|p| std::cmp::Reverse(p.likes.len()));
        posts.truncate(limit.max(0) as usize);
        Ok(posts)
    }

    async fn insert_athlete(&self, mut athlete: AthleteDoc) -> Result<ObjectId> {
        let id = ObjectId::new();
        athlete._id = Some(id);
        athlete.metadata.stamp_new();
        self.athletes.write().await.insert(id, athlete);
        Ok(id)
    }

    async fn find_athlete(&self, id: ObjectId) -> Result<Option<AthleteDoc>> {
        Ok(self.athletes.read().await.get(&id).cloned())
    }

    async fn update_athlete(&self, id: ObjectId, changes: AthleteChanges) -> Result<bool> {
        let mut athletes = self.athletes.write().await;
        let Some(athlete) = athletes.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(name) = changes.name {
            athlete.name = name;
        }
        if let Some(stats) = changes.stats {
            athlete.stats = stats;
        }
        athlete.metadata.touch();
        Ok(true)
    }

    async fn delete_athlete(&self, id: ObjectId) -> Result<bool> {
        Ok(self.athletes.write().await.remove(&id).is_some())
    }

    async fn set_athlete_profile(
        &self,
        user: ObjectId,
        profile: Option<ObjectId>,
    ) -> Result<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&user) else {
            return Ok(false);
        };
        user.athlete_profile = profile;
        Ok(true)
    }
}
