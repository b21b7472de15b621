use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::store::StoreError;

pub const TREES: &str = "trees";
pub const DUPLICATES: &str = "duplicates";
pub const RATINGS: &str = "ratings";

/// A canonical tree row. At most one exists per (name, species,
/// student_id); the store's unique index on that triple enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRecord {
    pub id: Uuid,
    pub name: String,
    pub species: String,
    pub description: String,
    pub image_url: String,
    pub css_style: String,
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert shape for `trees` — store-generated fields omitted.
#[derive(Debug, Clone, Serialize)]
pub struct NewTree {
    pub name: String,
    pub species: String,
    pub description: String,
    pub image_url: String,
    pub css_style: String,
    pub student_id: String,
}

/// A diverted submission: the same attribute shape as a tree plus a
/// reference to the canonical tree it duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateRecord {
    pub id: Uuid,
    pub tree_id: Uuid,
    pub name: String,
    pub species: String,
    pub description: String,
    pub image_url: String,
    pub css_style: String,
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewDuplicate {
    pub tree_id: Uuid,
    pub name: String,
    pub species: String,
    pub description: String,
    pub image_url: String,
    pub css_style: String,
    pub student_id: String,
}

impl NewDuplicate {
    pub fn referencing(tree_id: Uuid, submission: NewTree) -> Self {
        Self {
            tree_id,
            name: submission.name,
            species: submission.species,
            description: submission.description,
            image_url: submission.image_url,
            css_style: submission.css_style,
            student_id: submission.student_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingRecord {
    pub id: Uuid,
    pub tree_id: Uuid,
    pub student_id: String,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert shape for `ratings`. `tree_id` stays a string on the way in:
/// no existence or format check happens here, the store's own verdict on
/// a bad reference is surfaced as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRating {
    pub tree_id: String,
    pub student_id: String,
    pub rating: f64,
}

/// A tree with all its ratings embedded, as returned by the read paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeWithRatings {
    #[serde(flatten)]
    pub tree: TreeRecord,
    pub ratings: Vec<RatingRecord>,
}

/// Decodes a gateway row into a typed record; a malformed row is a store
/// fault.
pub fn from_row<T: DeserializeOwned>(row: Value) -> Result<T, AppError> {
    serde_json::from_value(row).map_err(|e| AppError::Store(StoreError::Parse(e)))
}
