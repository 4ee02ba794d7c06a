//! Athlete profile schema
//!
//! `stats` is an open mapping from stat name to a closed scalar variant.
//! The closed variant replaces the original free-form values: anything that
//! is not a number, string or boolean is rejected at deserialization.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for athlete profiles
pub const ATHLETE_COLLECTION: &str = "athletes";

/// A single stat value. Untagged, so `7.5`, `"left wing"` and `true` all
/// deserialize directly; arrays, objects and null do not.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

/// Athlete profile document, one-to-one with a user
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AthleteDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Athlete display name (taken from the owning user at creation)
    pub name: String,

    /// Open stat mapping, e.g. {"sport": "rowing", "weight_kg": 72.5}
    #[serde(default)]
    pub stats: HashMap<String, StatValue>,
}

impl AthleteDoc {
    pub fn new(name: String, stats: HashMap<String, StatValue>) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            name,
            stats,
        }
    }

    pub fn to_view(&self) -> AthleteView {
        AthleteView {
            id: self._id.map(|id| id.to_hex()).unwrap_or_default(),
            name: self.name.clone(),
            stats: self.stats.clone(),
            created_at: self.metadata.created_at.map(|d| d.to_string()),
        }
    }
}

/// Athlete profile response shape
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AthleteView {
    pub id: String,
    pub name: String,
    pub stats: HashMap<String, StatValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl IntoIndexes for AthleteDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "name": 1 },
            Some(
                IndexOptions::builder()
                    .name("name_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for AthleteDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_value_closed_variants() {
        let stats: HashMap<String, StatValue> = serde_json::from_str(
            r#"{"sport": "rowing", "weight_kg": 72.5, "active": true}"#,
        )
        .unwrap();

        assert_eq!(stats["sport"], StatValue::Text("rowing".into()));
        assert_eq!(stats["weight_kg"], StatValue::Number(72.5));
        assert_eq!(stats["active"], StatValue::Flag(true));
    }

    #[test]
    fn test_stat_value_rejects_structures() {
        let nested: Result<HashMap<String, StatValue>, _> =
            serde_json::from_str(r#"{"splits": [1, 2, 3]}"#);
        assert!(nested.is_err());

        let object: Result<HashMap<String, StatValue>, _> =
            serde_json::from_str(r#"{"coach": {"name": "Sam"}}"#);
        assert!(object.is_err());

        let null: Result<HashMap<String, StatValue>, _> =
            serde_json::from_str(r#"{"sport": null}"#);
        assert!(null.is_err());
    }
}
