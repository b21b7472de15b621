//! Read workflows: all trees, or one tree by id, with ratings embedded.
//! The join lives here — one scan per table, grouped in memory — so the
//! gateway contract stays a flat select-with-filter.

use std::collections::HashMap;

use uuid::Uuid;

use crate::errors::AppError;
use crate::gallery::models::{
    from_row, RatingRecord, TreeRecord, TreeWithRatings, RATINGS, TREES,
};
use crate::store::{Filter, RecordStore, StoreError};

/// Every tree with its ratings, in the store's natural order. No
/// pagination or filtering.
pub async fn list_trees(store: &dyn RecordStore) -> Result<Vec<TreeWithRatings>, AppError> {
    let trees = store.select(TREES, &[]).await?;
    let ratings = store.select(RATINGS, &[]).await?;

    let mut by_tree: HashMap<Uuid, Vec<RatingRecord>> = HashMap::new();
    for row in ratings {
        let rating: RatingRecord = from_row(row)?;
        by_tree.entry(rating.tree_id).or_default().push(rating);
    }

    trees
        .into_iter()
        .map(|row| {
            let tree: TreeRecord = from_row(row)?;
            let ratings = by_tree.remove(&tree.id).unwrap_or_default();
            Ok(TreeWithRatings { tree, ratings })
        })
        .collect()
}

pub async fn get_tree(store: &dyn RecordStore, id: Uuid) -> Result<TreeWithRatings, AppError> {
    let row = store
        .select_one(TREES, &[Filter::Eq("id", id.to_string())])
        .await
        .map_err(|e| match e {
            StoreError::NotFound => AppError::NotFound("Tree not found".to_string()),
            other => other.into(),
        })?;
    let tree: TreeRecord = from_row(row)?;

    let ratings = store
        .select(RATINGS, &[Filter::Eq("tree_id", id.to_string())])
        .await?
        .into_iter()
        .map(from_row::<RatingRecord>)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TreeWithRatings { tree, ratings })
}
