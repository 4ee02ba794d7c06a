//! Social graph mutations
//!
//! A follow edge is stored redundantly on both sides: `target` in the
//! actor's `following` and `actor` in the target's `followers`. The two
//! halves must move together; a half-edge is an inconsistency, not a race.
//! When the second half fails to apply, the first half is rolled back with
//! a compensating write, and if that also fails the whole operation
//! surfaces as a store failure rather than being swallowed.
//!
//! The operation is a toggle: it inspects current state and flips it.
//! Callers needing set-state semantics must query first and then toggle.

use bson::oid::ObjectId;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::Principal;
use crate::db::store::SocialStore;
use crate::types::{HuddleError, Result};

/// What a toggle actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowOutcome {
    Followed,
    Unfollowed,
}

/// Mutates follow/follower edge pairs
pub struct SocialGraphManager {
    store: Arc<dyn SocialStore>,
}

impl SocialGraphManager {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Toggle the follow edge from `actor` to `target`.
    ///
    /// The principal must be the actor or an admin; actor and target must
    /// be distinct existing users.
    pub async fn toggle_follow(
        &self,
        principal: &Principal,
        actor: ObjectId,
        target: ObjectId,
    ) -> Result<FollowOutcome> {
        if actor == target {
            return Err(HuddleError::SelfReference);
        }
        if !principal.owns_or_admin(actor) {
            return Err(HuddleError::Forbidden(
                "cannot follow or unfollow for another user".into(),
            ));
        }

        let actor_doc = self
            .store
            .find_user(actor)
            .await?
            .ok_or(HuddleError::NotFound("user"))?;
        self.store
            .find_user(target)
            .await?
            .ok_or(HuddleError::NotFound("user"))?;

        if actor_doc.following.contains(&target) {
            self.remove_edge(actor, target).await?;
            Ok(FollowOutcome::Unfollowed)
        } else {
            self.add_edge(actor, target).await?;
            Ok(FollowOutcome::Followed)
        }
    }

    /// Apply both halves of a new edge as one unit of work.
    async fn add_edge(&self, actor: ObjectId, target: ObjectId) -> Result<()> {
        let first = self.store.add_following(actor, target).await?;

        if let Err(second) = self.store.add_follower(target, actor).await {
            // Roll the first half back; only needed when it applied here
            if first {
                if let Err(undo) = self.store.remove_following(actor, target).await {
                    return Err(HuddleError::Store(format!(
                        "half-applied follow edge could not be rolled back: {} (after: {})",
                        undo, second
                    )));
                }
            }
            return Err(HuddleError::Store(format!(
                "follow edge not applied: {}",
                second
            )));
        }

        Ok(())
    }

    /// Remove both halves of an edge as one unit of work.
    async fn remove_edge(&self, actor: ObjectId, target: ObjectId) -> Result<()> {
        let first = self.store.remove_following(actor, target).await?;

        if let Err(second) = self.store.remove_follower(target, actor).await {
            if first {
                if let Err(undo) = self.store.add_following(actor, target).await {
                    return Err(HuddleError::Store(format!(
                        "half-removed follow edge could not be restored: {} (after: {})",
                        undo, second
                    )));
                }
            }
            return Err(HuddleError::Store(format!(
                "follow edge not removed: {}",
                second
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
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

    async fn setup() -> (Arc<MemoryStore>, SocialGraphManager, ObjectId, ObjectId) {
        let store = Arc::new(MemoryStore::new());
        let graph = SocialGraphManager::new(store.clone());
        let a = seed_user(&store, "alice").await;
        let b = seed_user(&store, "bob").await;
        (store, graph, a, b)
    }

    #[tokio::test]
    async fn test_follow_creates_symmetric_edge() {
        let (store, graph, a, b) = setup().await;
        let principal = Principal::new(a, Role::User);

        let outcome = graph.toggle_follow(&principal, a, b).await.unwrap();
        assert_eq!(outcome, FollowOutcome::Followed);

        let alice = store.find_user(a).await.unwrap().unwrap();
        let bob = store.find_user(b).await.unwrap().unwrap();
        assert!(alice.following.contains(&b));
        assert!(bob.followers.contains(&a));
        // Never only one side
        assert_eq!(alice.following.contains(&b), bob.followers.contains(&a));
    }

    #[tokio::test]
    async fn test_second_toggle_removes_both_sides() {
        let (store, graph, a, b) = setup().await;
        let principal = Principal::new(a, Role::User);

        graph.toggle_follow(&principal, a, b).await.unwrap();
        let outcome = graph.toggle_follow(&principal, a, b).await.unwrap();
        assert_eq!(outcome, FollowOutcome::Unfollowed);

        let alice = store.find_user(a).await.unwrap().unwrap();
        let bob = store.find_user(b).await.unwrap().unwrap();
        assert!(!alice.following.contains(&b));
        assert!(!bob.followers.contains(&a));
    }

    #[tokio::test]
    async fn test_self_follow_rejected() {
        let (_, graph, a, _) = setup().await;
        let principal = Principal::new(a, Role::User);

        let err = graph.toggle_follow(&principal, a, a).await.unwrap_err();
        assert!(matches!(err, HuddleError::SelfReference));
    }

    #[tokio::test]
    async fn test_acting_for_another_user_forbidden() {
        let (store, graph, a, b) = setup().await;
        let mallory = seed_user(&store, "mallory").await;
        let principal = Principal::new(mallory, Role::User);

        let err = graph.toggle_follow(&principal, a, b).await.unwrap_err();
        assert!(matches!(err, HuddleError::Forbidden(_)));

        // No half-edge appeared
        let alice = store.find_user(a).await.unwrap().unwrap();
        assert!(alice.following.is_empty());
    }

    #[tokio::test]
    async fn test_admin_may_toggle_for_another_user() {
        let (store, graph, a, b) = setup().await;
        let admin = seed_user(&store, "moderator").await;
        let principal = Principal::new(admin, Role::Admin);

        let outcome = graph.toggle_follow(&principal, a, b).await.unwrap();
        assert_eq!(outcome, FollowOutcome::Followed);
    }

    #[tokio::test]
    async fn test_missing_target_is_not_found() {
        let (_, graph, a, _) = setup().await;
        let principal = Principal::new(a, Role::User);

        let err = graph
            .toggle_follow(&principal, a, ObjectId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HuddleError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_actor_is_not_found() {
        let (_, graph, _, b) = setup().await;
        let ghost = ObjectId::new();
        let principal = Principal::new(ghost, Role::User);

        let err = graph.toggle_follow(&principal, ghost, b).await.unwrap_err();
        assert!(matches!(err, HuddleError::NotFound(_)));
    }
}
