//! Post document schema
//!
//! A post owns its engagement: `likes` is a set of user ids (membership is
//! the source of truth, never a counter) and `comments` is an append-only
//! sequence. `shared_post` is the one-level share backlink.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for posts
pub const POST_COLLECTION: &str = "posts";

/// Post document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PostDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    pub content: String,

    /// Owning user. Immutable after creation.
    pub author: ObjectId,

    /// Users who like this post; each appears at most once
    #[serde(default)]
    pub likes: Vec<ObjectId>,

    /// Comments in insertion order (insertion order = chronological order)
    #[serde(default)]
    pub comments: Vec<CommentEntry>,

    /// When this post is a share: the post the sharer re-posted.
    /// One level only, never resolved transitively.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_post: Option<ObjectId>,
}

/// A single comment on a post
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CommentEntry {
    pub _id: ObjectId,
    pub author: ObjectId,
    pub text: String,
    pub created_at: DateTime,
}

impl CommentEntry {
    pub fn new(author: ObjectId, text: String) -> Self {
        Self {
            _id: ObjectId::new(),
            author,
            text,
            created_at: DateTime::now(),
        }
    }
}

impl PostDoc {
    pub fn new(title: String, content: String, author: ObjectId) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            title,
            content,
            author,
            likes: Vec::new(),
            comments: Vec::new(),
            shared_post: None,
        }
    }

    /// Build the share of an existing post: same title and content, new
    /// author, backlink to the post being re-posted.
    pub fn share_of(original: &PostDoc, sharer: ObjectId) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            title: original.title.clone(),
            content: original.content.clone(),
            author: sharer,
            likes: Vec::new(),
            comments: Vec::new(),
            shared_post: original._id,
        }
    }

    /// Response view with ids rendered as hex strings
    pub fn to_view(&self) -> PostView {
        PostView {
            id: self._id.map(|id| id.to_hex()).unwrap_or_default(),
            title: self.title.clone(),
            content: self.content.clone(),
            author: self.author.to_hex(),
            likes: self.likes.iter().map(|id| id.to_hex()).collect(),
            comments: self.comments.iter().map(CommentEntry::to_view).collect(),
            shared_post: self.shared_post.map(|id| id.to_hex()),
            created_at: self.metadata.created_at.map(|d| d.to_string()),
        }
    }
}

impl CommentEntry {
    pub fn to_view(&self) -> CommentView {
        CommentView {
            id: self._id.to_hex(),
            author: self.author.to_hex(),
            text: self.text.clone(),
            created_at: self.created_at.to_string(),
        }
    }
}

/// Post response shape
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub likes: Vec<String>,
    pub comments: Vec<CommentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_post: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Comment response shape
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub author: String,
    pub text: String,
    pub created_at: String,
}

impl IntoIndexes for PostDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Author feed query: author ∈ set, newest first
            (
                doc! { "author": 1, "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("author_created_at".to_string())
                        .build(),
                ),
            ),
            // Discovery feed query: trailing window scan
            (
                doc! { "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("created_at_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for PostDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_points_at_shared_post_not_transitively() {
        let author = ObjectId::new();
        let mut original = PostDoc::new("title".into(), "content".into(), author);
        original._id = Some(ObjectId::new());

        let sharer = ObjectId::new();
        let mut share = PostDoc::share_of(&original, sharer);
        share._id = Some(ObjectId::new());
        assert_eq!(share.shared_post, original._id);
        assert_eq!(share.author, sharer);

        // Sharing the share points at the share, not the original
        let re_sharer = ObjectId::new();
        let second = PostDoc::share_of(&share, re_sharer);
        assert_eq!(second.shared_post, share._id);
    }
}
