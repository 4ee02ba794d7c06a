//! MongoDB implementation of the `SocialStore` contract
//!
//! Membership mutations use `$addToSet`/`$pull` so concurrent toggles never
//! lose updates; whether a document changed is read off `modified_count`.
//! The like-count feed ordering is a real `$size`-based aggregation sort.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use futures_util::StreamExt;
use mongodb::options::{FindOptions, UpdateOptions};

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{
    AthleteDoc, CommentEntry, NotificationEntry, PostDoc, UserDoc, ATHLETE_COLLECTION,
    POST_COLLECTION, USER_COLLECTION,
};
use crate::db::store::{AthleteChanges, ProfileChanges, SocialStore};
use crate::types::{HuddleError, Result};

/// Production store backed by MongoDB
pub struct MongoStore {
    users: MongoCollection<UserDoc>,
    posts: MongoCollection<PostDoc>,
    athletes: MongoCollection<AthleteDoc>,
}

impl MongoStore {
    /// Open the three collections and apply their indexes
    pub async fn new(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            users: client.collection::<UserDoc>(USER_COLLECTION).await?,
            posts: client.collection::<PostDoc>(POST_COLLECTION).await?,
            athletes: client.collection::<AthleteDoc>(ATHLETE_COLLECTION).await?,
        })
    }

    /// Run a single-field atomic membership update against the users
    /// collection. `modified_count` tells whether membership changed;
    /// `$addToSet`/`$pull` leave an already-correct document untouched.
    async fn user_membership(&self, filter: Document, update: Document) -> Result<bool> {
        let result = self.users.update_one(filter, update).await?;
        Ok(result.modified_count > 0)
    }
}

#[async_trait]
impl SocialStore for MongoStore {
    async fn insert_user(&self, user: UserDoc) -> Result<ObjectId> {
        self.users.insert_one(user).await
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "_id": id }).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "username": username }).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
        self.users
            .find_one(doc! { "email": email.to_lowercase() })
            .await
    }

    async fn update_user_profile(&self, id: ObjectId, changes: ProfileChanges) -> Result<bool> {
        let mut set = doc! { "metadata.updated_at": DateTime::now() };
        if let Some(name) = changes.name {
            set.insert("name", name);
        }
        if let Some(bio) = changes.bio {
            set.insert("bio", bio);
        }
        if let Some(avatar) = changes.avatar {
            set.insert("avatar", avatar);
        }
        if let Some(links) = changes.social_links {
            let links = bson::to_bson(&links)
                .map_err(|e| HuddleError::Store(format!("Serialize failed: {}", e)))?;
            set.insert("social_links", links);
        }

        let result = self
            .users
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn add_following(&self, user: ObjectId, target: ObjectId) -> Result<bool> {
        self.user_membership(
            doc! { "_id": user },
            doc! { "$addToSet": { "following": target } },
        )
        .await
    }

    async fn remove_following(&self, user: ObjectId, target: ObjectId) -> Result<bool> {
        self.user_membership(
            doc! { "_id": user },
            doc! { "$pull": { "following": target } },
        )
        .await
    }

    async fn add_follower(&self, user: ObjectId, follower: ObjectId) -> Result<bool> {
        self.user_membership(
            doc! { "_id": user },
            doc! { "$addToSet": { "followers": follower } },
        )
        .await
    }

    async fn remove_follower(&self, user: ObjectId, follower: ObjectId) -> Result<bool> {
        self.user_membership(
            doc! { "_id": user },
            doc! { "$pull": { "followers": follower } },
        )
        .await
    }

    async fn push_notification(&self, user: ObjectId, entry: NotificationEntry) -> Result<bool> {
        let entry = bson::to_bson(&entry)
            .map_err(|e| HuddleError::Store(format!("Serialize failed: {}", e)))?;
        let result = self
            .users
            .update_one(
                doc! { "_id": user },
                doc! { "$push": { "notifications": entry } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn mark_notifications(
        &self,
        user: ObjectId,
        ids: &[ObjectId],
        is_read: bool,
    ) -> Result<bool> {
        let options = UpdateOptions::builder()
            .array_filters(vec![doc! { "entry._id": { "$in": ids.to_vec() } }])
            .build();

        let result = self
            .users
            .inner()
            .update_one(
                doc! { "_id": user },
                doc! { "$set": { "notifications.$[entry].is_read": is_read } },
            )
            .with_options(options)
            .await
            .map_err(|e| HuddleError::Store(format!("Update failed: {}", e)))?;

        Ok(result.matched_count > 0)
    }

    async fn insert_post(&self, post: PostDoc) -> Result<ObjectId> {
        self.posts.insert_one(post).await
    }

    async fn find_post(&self, id: ObjectId) -> Result<Option<PostDoc>> {
        self.posts.find_one(doc! { "_id": id }).await
    }

    async fn update_post_body(&self, id: ObjectId, title: &str, content: &str) -> Result<bool> {
        let result = self
            .posts
            .update_one(
                doc! { "_id": id, "metadata.is_deleted": { "$ne": true } },
                doc! { "$set": {
                    "title": title,
                    "content": content,
                    "metadata.updated_at": DateTime::now(),
                } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_post(&self, id: ObjectId) -> Result<bool> {
        let result = self
            .posts
            .soft_delete(doc! { "_id": id, "metadata.is_deleted": { "$ne": true } })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn posts_by_author(&self, author: ObjectId) -> Result<Vec<PostDoc>> {
        let options = FindOptions::builder()
            .sort(doc! { "metadata.created_at": -1 })
            .build();
        self.posts
            .find_many(doc! { "author": author }, Some(options))
            .await
    }

    async fn add_like(&self, post: ObjectId, user: ObjectId) -> Result<bool> {
        let result = self
            .posts
            .update_one(doc! { "_id": post }, doc! { "$addToSet": { "likes": user } })
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn remove_like(&self, post: ObjectId, user: ObjectId) -> Result<bool> {
        let result = self
            .posts
            .update_one(doc! { "_id": post }, doc! { "$pull": { "likes": user } })
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn push_comment(&self, post: ObjectId, comment: CommentEntry) -> Result<bool> {
        let comment = bson::to_bson(&comment)
            .map_err(|e| HuddleError::Store(format!("Serialize failed: {}", e)))?;
        let result = self
            .posts
            .update_one(
                doc! { "_id": post, "metadata.is_deleted": { "$ne": true } },
                doc! { "$push": { "comments": comment } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn pull_comment(&self, post: ObjectId, comment: ObjectId) -> Result<bool> {
        let result = self
            .posts
            .update_one(
                doc! { "_id": post },
                doc! { "$pull": { "comments": { "_id": comment } } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn posts_by_authors_newest(
        &self,
        authors: &[ObjectId],
        limit: i64,
    ) -> Result<Vec<PostDoc>> {
        let options = FindOptions::builder()
            .sort(doc! { "metadata.created_at": -1 })
            .limit(limit)
            .build();
        self.posts
            .find_many(doc! { "author": { "$in": authors.to_vec() } }, Some(options))
            .await
    }

    async fn posts_since_by_likes(&self, cutoff: DateTime, limit: i64) -> Result<Vec<PostDoc>> {
        let pipeline = vec![
            doc! { "$match": {
                "metadata.created_at": { "$gte": cutoff },
                "metadata.is_deleted": { "$ne": true },
            } },
            doc! { "$addFields": { "like_count": { "$size": "$likes" } } },
            doc! { "$sort": { "like_count": -1 } },
            doc! { "$limit": limit },
        ];

        let mut cursor = self
            .posts
            .inner()
            .aggregate(pipeline)
            .await
            .map_err(|e| HuddleError::Store(format!("Aggregate failed: {}", e)))?;

        let mut posts = Vec::new();
        while let Some(document) = cursor.next().await {
            let document =
                document.map_err(|e| HuddleError::Store(format!("Cursor failed: {}", e)))?;
            let post: PostDoc = bson::from_document(document)
                .map_err(|e| HuddleError::Store(format!("Deserialize failed: {}", e)))?;
            posts.push(post);
        }

        Ok(posts)
    }

    async fn insert_athlete(&self, athlete: AthleteDoc) -> Result<ObjectId> {
        self.athletes.insert_one(athlete).await
    }

    async fn find_athlete(&self, id: ObjectId) -> Result<Option<AthleteDoc>> {
        self.athletes.find_one(doc! { "_id": id }).await
    }

    async fn update_athlete(&self, id: ObjectId, changes: AthleteChanges) -> Result<bool> {
        let mut set = doc! { "metadata.updated_at": DateTime::now() };
        if let Some(name) = changes.name {
            set.insert("name", name);
        }
        if let Some(stats) = changes.stats {
            let stats = bson::to_bson(&stats)
                .map_err(|e| HuddleError::Store(format!("Serialize failed: {}", e)))?;
            set.insert("stats", stats);
        }

        let result = self
            .athletes
            .update_one(
                doc! { "_id": id, "metadata.is_deleted": { "$ne": true } },
                doc! { "$set": set },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_athlete(&self, id: ObjectId) -> Result<bool> {
        let result = self
            .athletes
            .soft_delete(doc! { "_id": id, "metadata.is_deleted": { "$ne": true } })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_athlete_profile(
        &self,
        user: ObjectId,
        profile: Option<ObjectId>,
    ) -> Result<bool> {
        let update = match profile {
            Some(id) => doc! { "$set": { "athlete_profile": id } },
            None => doc! { "$unset": { "athlete_profile": "" } },
        };

        let result = self.users.update_one(doc! { "_id": user }, update).await?;
        Ok(result.matched_count > 0)
    }
}
