//! Administrative purge workflows, gated by the shared admin secret.
//!
//! Cascades are enforced here, not by the store: dependents (ratings,
//! duplicates) are deleted before their tree. The deletes are separate
//! store calls with no spanning transaction; a failure part-way leaves
//! earlier deletions in place and surfaces the store's message.

use axum::http::HeaderMap;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::gallery::models::{DUPLICATES, RATINGS, TREES};
use crate::store::{Filter, RecordStore, StoreError};

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Exact-match gate on the shared admin secret. Fails closed — a missing
/// or mismatched key returns before any store access.
pub fn require_admin(headers: &HeaderMap, admin_key: &str) -> Result<(), AppError> {
    let supplied = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if supplied != Some(admin_key) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Matches every row: id ≠ the nil sentinel.
fn any_row() -> [Filter; 1] {
    [Filter::Neq("id", Uuid::nil().to_string())]
}

/// Deletes every rating, duplicate, and tree, dependents first.
pub async fn purge_all(store: &dyn RecordStore) -> Result<(), AppError> {
    store.delete(RATINGS, &any_row()).await?;
    store.delete(DUPLICATES, &any_row()).await?;
    store.delete(TREES, &any_row()).await?;
    info!("Purged all trees, duplicates, and ratings");
    Ok(())
}

/// Deletes one tree and everything referencing it. The tree must exist.
pub async fn purge_tree(store: &dyn RecordStore, id: Uuid) -> Result<(), AppError> {
    store
        .select_one(TREES, &[Filter::Eq("id", id.to_string())])
        .await
        .map_err(|e| match e {
            StoreError::NotFound => AppError::NotFound("Tree not found".to_string()),
            other => other.into(),
        })?;

    let referencing = [Filter::Eq("tree_id", id.to_string())];
    store.delete(RATINGS, &referencing).await?;
    store.delete(DUPLICATES, &referencing).await?;
    store
        .delete(TREES, &[Filter::Eq("id", id.to_string())])
        .await?;
    info!("Purged tree {id} with its ratings and duplicates");
    Ok(())
}
