pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::gallery::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/trees",
            get(handlers::handle_list_trees)
                .post(handlers::handle_create_tree)
                .delete(handlers::handle_purge_all),
        )
        .route(
            "/trees/:id",
            get(handlers::handle_get_tree).delete(handlers::handle_purge_tree),
        )
        .route("/ratings", post(handlers::handle_create_rating))
        .route("/upload-image", post(handlers::handle_upload_image))
        .with_state(state)
}
