use axum::routing::get;
use axum::Router;

use crate::handlers::models;
use crate::state::AppState;

/// Model training routes mounted at `/models`.
///
/// ```text
/// GET    /                  -> list_models
/// POST   /                  -> create_model
/// GET    /{id}              -> get_model
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(models::list_models).post(models::create_model))
        .route("/{id}", get(models::get_model))
}
