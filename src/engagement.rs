//! Post engagement: likes and comments
//!
//! Likes toggle by set membership, so the same user can never appear twice
//! and two toggles return the post to its original state. Comments append
//! in insertion order and are removed individually, with the removal gated
//! on comment authorship or admin. None of these operations create or
//! delete posts.

use bson::oid::ObjectId;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::Principal;
use crate::db::schemas::CommentEntry;
use crate::db::store::SocialStore;
use crate::types::{HuddleError, Result};
use crate::validate;

/// What a like toggle actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeOutcome {
    Liked,
    Unliked,
}

/// Mutates a post's likes and comments
pub struct EngagementManager {
    store: Arc<dyn SocialStore>,
}

impl EngagementManager {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Toggle `user`'s like on a post: present removes it, absent adds it.
    pub async fn toggle_like(&self, post: ObjectId, user: ObjectId) -> Result<LikeOutcome> {
        // Existence check first so a missing post never mutates anything
        self.store
            .find_post(post)
            .await?
            .ok_or(HuddleError::NotFound("post"))?;

        // Try the removal half first; when nothing was removed the user was
        // not a member, so add. Both halves are atomic set operations, and
        // losing a race just means the other toggle already converged the
        // membership.
        if self.store.remove_like(post, user).await? {
            return Ok(LikeOutcome::Unliked);
        }

        self.store.add_like(post, user).await?;
        Ok(LikeOutcome::Liked)
    }

    /// Append a comment with a fresh id and the current timestamp.
    pub async fn add_comment(
        &self,
        post: ObjectId,
        author: ObjectId,
        text: &str,
    ) -> Result<CommentEntry> {
        let text = validate::non_empty("comment", text).map_err(HuddleError::InvalidInput)?;

        self.store
            .find_post(post)
            .await?
            .ok_or(HuddleError::NotFound("post"))?;

        let comment = CommentEntry::new(author, text);
        if !self.store.push_comment(post, comment.clone()).await? {
            return Err(HuddleError::NotFound("post"));
        }

        Ok(comment)
    }

    /// Remove one comment by id. Only the comment's author or an admin may
    /// remove it; the rest of the sequence keeps its order.
    pub async fn remove_comment(
        &self,
        post: ObjectId,
        comment: ObjectId,
        principal: &Principal,
    ) -> Result<()> {
        let post_doc = self
            .store
            .find_post(post)
            .await?
            .ok_or(HuddleError::NotFound("post"))?;

        let entry = post_doc
            .comments
            .iter()
            .find(|c| c._id == comment)
            .ok_or(HuddleError::NotFound("comment"))?;

        if !principal.owns_or_admin(entry.author) {
            return Err(HuddleError::Forbidden(
                "only the comment author or an admin may delete a comment".into(),
            ));
        }

        if !self.store.pull_comment(post, comment).await? {
            return Err(HuddleError::NotFound("comment"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::db::schemas::PostDoc;
    use crate::db::MemoryStore;

    async fn setup() -> (Arc<MemoryStore>, EngagementManager, ObjectId, ObjectId) {
        let store = Arc::new(MemoryStore::new());
        let engagement = EngagementManager::new(store.clone());
        let author = ObjectId::new();
        let post = store
            .insert_post(PostDoc::new("title".into(), "content".into(), author))
            .await
            .unwrap();
        (store, engagement, post, author)
    }

    #[tokio::test]
    async fn test_like_toggle_is_idempotent_pair() {
        let (store, engagement, post, _) = setup().await;
        let user = ObjectId::new();

        let before = store.find_post(post).await.unwrap().unwrap().likes.clone();

        assert_eq!(
            engagement.toggle_like(post, user).await.unwrap(),
            LikeOutcome::Liked
        );
        assert_eq!(
            engagement.toggle_like(post, user).await.unwrap(),
            LikeOutcome::Unliked
        );

        let after = store.find_post(post).await.unwrap().unwrap().likes;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_like_membership_never_duplicates() {
        let (store, engagement, post, _) = setup().await;
        let user = ObjectId::new();

        engagement.toggle_like(post, user).await.unwrap();
        let likes = store.find_post(post).await.unwrap().unwrap().likes;
        assert_eq!(likes.iter().filter(|id| **id == user).count(), 1);
    }

    #[tokio::test]
    async fn test_like_on_missing_post_mutates_nothing() {
        let (store, engagement, post, _) = setup().await;
        let user = ObjectId::new();

        let err = engagement
            .toggle_like(ObjectId::new(), user)
            .await
            .unwrap_err();
        assert!(matches!(err, HuddleError::NotFound(_)));

        let likes = store.find_post(post).await.unwrap().unwrap().likes;
        assert!(likes.is_empty());
    }

    #[tokio::test]
    async fn test_add_then_remove_comment_restores_list() {
        let (store, engagement, post, author) = setup().await;

        engagement
            .add_comment(post, author, "first")
            .await
            .unwrap();
        let before: Vec<ObjectId> = store
            .find_post(post)
            .await
            .unwrap()
            .unwrap()
            .comments
            .iter()
            .map(|c| c._id)
            .collect();

        let added = engagement
            .add_comment(post, author, "second")
            .await
            .unwrap();
        let principal = Principal::new(author, Role::User);
        engagement
            .remove_comment(post, added._id, &principal)
            .await
            .unwrap();

        let after: Vec<ObjectId> = store
            .find_post(post)
            .await
            .unwrap()
            .unwrap()
            .comments
            .iter()
            .map(|c| c._id)
            .collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_comments_keep_insertion_order() {
        let (store, engagement, post, author) = setup().await;

        let first = engagement.add_comment(post, author, "one").await.unwrap();
        let second = engagement.add_comment(post, author, "two").await.unwrap();
        let third = engagement.add_comment(post, author, "three").await.unwrap();

        let principal = Principal::new(author, Role::User);
        engagement
            .remove_comment(post, second._id, &principal)
            .await
            .unwrap();

        let remaining: Vec<ObjectId> = store
            .find_post(post)
            .await
            .unwrap()
            .unwrap()
            .comments
            .iter()
            .map(|c| c._id)
            .collect();
        assert_eq!(remaining, vec![first._id, third._id]);
    }

    #[tokio::test]
    async fn test_non_author_cannot_remove_comment() {
        let (store, engagement, post, author) = setup().await;

        let comment = engagement.add_comment(post, author, "mine").await.unwrap();
        let stranger = Principal::new(ObjectId::new(), Role::User);

        let err = engagement
            .remove_comment(post, comment._id, &stranger)
            .await
            .unwrap_err();
        assert!(matches!(err, HuddleError::Forbidden(_)));

        // Comment is still present
        let comments = store.find_post(post).await.unwrap().unwrap().comments;
        assert!(comments.iter().any(|c| c._id == comment._id));
    }

    #[tokio::test]
    async fn test_admin_can_remove_any_comment() {
        let (_, engagement, post, author) = setup().await;

        let comment = engagement.add_comment(post, author, "mine").await.unwrap();
        let admin = Principal::new(ObjectId::new(), Role::Admin);

        engagement
            .remove_comment(post, comment._id, &admin)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_remove_missing_comment_not_found() {
        let (_, engagement, post, author) = setup().await;
        let principal = Principal::new(author, Role::User);

        let err = engagement
            .remove_comment(post, ObjectId::new(), &principal)
            .await
            .unwrap_err();
        assert!(matches!(err, HuddleError::NotFound("comment")));
    }

    #[tokio::test]
    async fn test_empty_comment_rejected() {
        let (_, engagement, post, author) = setup().await;

        let err = engagement
            .add_comment(post, author, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, HuddleError::InvalidInput(_)));
    }
}
