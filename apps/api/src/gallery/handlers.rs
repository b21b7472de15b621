use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::gallery::ingest::{ingest_tree, IngestOutcome};
use crate::gallery::models::{NewRating, NewTree, RatingRecord, TreeWithRatings};
use crate::gallery::purge::{purge_all, purge_tree, require_admin};
use crate::gallery::queries::{get_tree, list_trees};
use crate::gallery::ratings::record_rating;
use crate::gallery::validation::parse_tree_id;
use crate::state::AppState;

/// Request body for POST /trees. `image` is the public URL a prior
/// /upload-image call produced; it lands in the store as `image_url`.
#[derive(Debug, Deserialize)]
pub struct TreeSubmission {
    pub name: String,
    pub species: String,
    pub description: String,
    pub image: String,
    pub css_style: String,
    pub student_id: String,
}

impl From<TreeSubmission> for NewTree {
    fn from(body: TreeSubmission) -> Self {
        NewTree {
            name: body.name,
            species: body.species,
            description: body.description,
            image_url: body.image,
            css_style: body.css_style,
            student_id: body.student_id,
        }
    }
}

/// POST /trees
pub async fn handle_create_tree(
    State(state): State<AppState>,
    Json(body): Json<TreeSubmission>,
) -> Result<(StatusCode, Json<IngestOutcome>), AppError> {
    let outcome = ingest_tree(state.store.as_ref(), body.into()).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /trees
pub async fn handle_list_trees(
    State(state): State<AppState>,
) -> Result<Json<Vec<TreeWithRatings>>, AppError> {
    Ok(Json(list_trees(state.store.as_ref()).await?))
}

/// GET /trees/:id
pub async fn handle_get_tree(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TreeWithRatings>, AppError> {
    let id = parse_tree_id(&id)?;
    Ok(Json(get_tree(state.store.as_ref(), id).await?))
}

/// DELETE /trees
pub async fn handle_purge_all(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    require_admin(&headers, &state.config.admin_key)?;
    purge_all(state.store.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /trees/:id — the admin gate runs before id validation.
pub async fn handle_purge_tree(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    require_admin(&headers, &state.config.admin_key)?;
    let id = parse_tree_id(&id)?;
    purge_tree(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /ratings
pub async fn handle_create_rating(
    State(state): State<AppState>,
    Json(body): Json<NewRating>,
) -> Result<(StatusCode, Json<RatingRecord>), AppError> {
    let rating = record_rating(state.store.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

/// POST /upload-image — multipart with a single `image` field.
pub async fn handle_upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or("image").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;
            let url = state.media.store(data, &filename).await?;
            return Ok(Json(json!({ "url": url })));
        }
    }
    Err(AppError::Validation(
        "Missing multipart field 'image'".to_string(),
    ))
}
