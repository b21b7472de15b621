//! Rating workflow: a pass-through insert. No existence check on
//! `tree_id` — the store's verdict on an unknown reference is surfaced
//! verbatim — and no uniqueness, a student may rate a tree repeatedly.

use tracing::info;

use crate::errors::AppError;
use crate::gallery::models::{from_row, NewRating, RatingRecord, RATINGS};
use crate::store::{RecordStore, StoreError};

pub async fn record_rating(
    store: &dyn RecordStore,
    submission: NewRating,
) -> Result<RatingRecord, AppError> {
    let record = serde_json::to_value(&submission).map_err(StoreError::from)?;
    let rating: RatingRecord = from_row(store.insert(RATINGS, record).await?)?;
    info!("Recorded rating {} for tree {}", rating.id, rating.tree_id);
    Ok(rating)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use uuid::Uuid;

    fn rating_for(tree_id: &str, score: f64) -> NewRating {
        NewRating {
            tree_id: tree_id.to_string(),
            student_id: "S2".to_string(),
            rating: score,
        }
    }

    #[tokio::test]
    async fn test_rating_inserts_without_existence_check() {
        let store = MemoryStore::new();
        let orphan = Uuid::new_v4();

        // No tree row exists; the insert still goes through.
        let rating = record_rating(&store, rating_for(&orphan.to_string(), 4.0))
            .await
            .unwrap();
        assert_eq!(rating.tree_id, orphan);
        assert_eq!(rating.rating, 4.0);
        assert_eq!(store.rows(RATINGS).len(), 1);
    }

    #[tokio::test]
    async fn test_same_student_may_rate_twice() {
        let store = MemoryStore::new();
        let tree = Uuid::new_v4().to_string();

        record_rating(&store, rating_for(&tree, 1.0)).await.unwrap();
        record_rating(&store, rating_for(&tree, 5.0)).await.unwrap();
        assert_eq!(store.rows(RATINGS).len(), 2);
    }
}
