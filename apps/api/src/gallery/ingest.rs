//! Ingestion workflow for new tree submissions.
//!
//! Duplicate detection leans on the store's unique index over
//! (name, species, student_id): the tree insert is attempted first, and a
//! conflict is the signal that a canonical tree already exists. Exactly
//! one insert lands per call — into `trees` or into `duplicates`, never
//! both — absent a store error.

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::gallery::models::{
    from_row, DuplicateRecord, NewDuplicate, NewTree, TreeRecord, DUPLICATES, TREES,
};
use crate::store::{Filter, RecordStore, StoreError};

/// What became of a submission: a fresh canonical tree, or a duplicate
/// row diverted to the existing tree for the same dedup key. Serializes
/// untagged — the response body is the bare inserted record either way.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IngestOutcome {
    Created(TreeRecord),
    Diverted(DuplicateRecord),
}

pub async fn ingest_tree(
    store: &dyn RecordStore,
    submission: NewTree,
) -> Result<IngestOutcome, AppError> {
    let record = serde_json::to_value(&submission).map_err(StoreError::from)?;

    match store.insert(TREES, record).await {
        Ok(row) => {
            let tree: TreeRecord = from_row(row)?;
            info!("Inserted tree {} for student {}", tree.id, tree.student_id);
            Ok(IngestOutcome::Created(tree))
        }
        Err(StoreError::Conflict(_)) => {
            // The constraint guarantees a canonical tree exists; absence
            // here is a store fault, not a tie-break.
            let canonical: TreeRecord =
                from_row(store.select_one(TREES, &dedup_filters(&submission)).await?)?;

            let duplicate = NewDuplicate::referencing(canonical.id, submission);
            let row = store
                .insert(
                    DUPLICATES,
                    serde_json::to_value(&duplicate).map_err(StoreError::from)?,
                )
                .await?;
            let duplicate: DuplicateRecord = from_row(row)?;
            info!(
                "Diverted duplicate {} to canonical tree {}",
                duplicate.id, duplicate.tree_id
            );
            Ok(IngestOutcome::Diverted(duplicate))
        }
        Err(e) => Err(e.into()),
    }
}

/// The dedup key as store filters: case-sensitive equality on all three
/// fields.
fn dedup_filters(submission: &NewTree) -> [Filter; 3] {
    [
        Filter::Eq("name", submission.name.clone()),
        Filter::Eq("species", submission.species.clone()),
        Filter::Eq("student_id", submission.student_id.clone()),
    ]
}
