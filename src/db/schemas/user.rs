//! User document schema
//!
//! Stores account identity, credentials, the redundant follow edges
//! (`following` on the actor side, `followers` on the target side, always
//! mutated in pairs by the graph component) and the user's notification
//! inbox.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Display name
    pub name: String,

    /// Unique handle
    pub username: String,

    /// Unique email, stored lowercased
    pub email: String,

    /// Argon2 password hash. Never serialized into API responses; the
    /// response shape is `UserProfile`.
    pub password_hash: String,

    /// Account role
    #[serde(default)]
    pub role: Role,

    /// URL of the profile picture
    #[serde(default = "default_avatar")]
    pub avatar: String,

    /// Short bio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Off-platform profile links
    #[serde(default)]
    pub social_links: SocialLinks,

    /// Users this user follows
    #[serde(default)]
    pub following: Vec<ObjectId>,

    /// Users following this user
    #[serde(default)]
    pub followers: Vec<ObjectId>,

    /// Notification inbox, append-only, oldest first
    #[serde(default)]
    pub notifications: Vec<NotificationEntry>,

    /// Optional link to this user's athlete profile (one-to-one)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub athlete_profile: Option<ObjectId>,
}

fn default_avatar() -> String {
    "https://example.com/default-avatar.png".to_string()
}

/// Off-platform profile links
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

/// An entry in a user's notification inbox
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NotificationEntry {
    pub _id: ObjectId,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime,
}

impl NotificationEntry {
    pub fn new(message: String) -> Self {
        Self {
            _id: ObjectId::new(),
            message,
            is_read: false,
            created_at: DateTime::now(),
        }
    }

    pub fn to_view(&self) -> NotificationView {
        NotificationView {
            id: self._id.to_hex(),
            message: self.message.clone(),
            is_read: self.is_read,
            created_at: self.created_at.to_string(),
        }
    }
}

/// Notification response shape
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

impl UserDoc {
    /// Create a new user document with defaults for everything but identity
    pub fn new(name: String, username: String, email: String, password_hash: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            name,
            username,
            email: email.to_lowercase(),
            password_hash,
            role: Role::User,
            avatar: default_avatar(),
            bio: None,
            social_links: SocialLinks::default(),
            following: Vec::new(),
            followers: Vec::new(),
            notifications: Vec::new(),
            athlete_profile: None,
        }
    }

    /// Public view of this user, safe to serialize into responses
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self._id.map(|id| id.to_hex()).unwrap_or_default(),
            name: self.name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            avatar: self.avatar.clone(),
            bio: self.bio.clone(),
            social_links: self.social_links.clone(),
            following: self.following.len(),
            followers: self.followers.len(),
            athlete_profile: self.athlete_profile.map(|id| id.to_hex()),
            created_at: self.metadata.created_at.map(|d| d.to_string()),
        }
    }

    /// Compact view used in follower/following listings
    pub fn to_summary(&self) -> UserSummary {
        UserSummary {
            id: self._id.map(|id| id.to_hex()).unwrap_or_default(),
            name: self.name.clone(),
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Public profile response shape (no credentials, edge lists as counts)
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub social_links: SocialLinks,
    pub following: usize,
    pub followers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub athlete_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Compact listing entry for follower/following responses
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "username": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("username_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_hides_credentials() {
        let mut user = UserDoc::new(
            "Ada".into(),
            "ada".into(),
            "Ada@Example.com".into(),
            "$argon2id$fake".into(),
        );
        user._id = Some(ObjectId::new());

        let profile = user.to_profile();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert_eq!(profile.email, "ada@example.com");
    }
}
