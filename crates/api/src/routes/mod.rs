pub mod gallery;
pub mod generation;
pub mod health;
pub mod models;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /generations                 submit and track a batch (POST, multipart)
/// /generations/{id}            single job status
///
/// /models                      list, create (POST, multipart)
/// /models/{id}                 training status
///
/// /gallery                     list
/// /gallery/sync                merge client records (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/generations", generation::router())
        .nest("/models", models::router())
        .nest("/gallery", gallery::router())
}
