use axum::routing::{get, post};
use axum::Router;

use crate::handlers::gallery;
use crate::state::AppState;

/// Gallery routes mounted at `/gallery`.
///
/// ```text
/// GET    /                  -> list_gallery
/// POST   /sync              -> sync_gallery
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(gallery::list_gallery))
        .route("/sync", post(gallery::sync_gallery))
}
