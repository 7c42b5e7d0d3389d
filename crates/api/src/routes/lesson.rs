//! Route definitions for lesson-scoped sub-resources.
//!
//! These routes are mounted at `/lessons` and provide access to the
//! content blocks that belong to a specific lesson.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::content_block;
use crate::state::AppState;

/// Routes mounted at `/lessons`.
///
/// ```text
/// GET    /{lesson_id}/blocks                 list_by_lesson
/// POST   /{lesson_id}/blocks                 create (appends)
/// PUT    /{lesson_id}/blocks/reorder         reorder
/// GET    /{lesson_id}/blocks/{id}            get_by_id
/// PUT    /{lesson_id}/blocks/{id}            update
/// DELETE /{lesson_id}/blocks/{id}            delete
/// ```
pub fn router() -> Router<AppState> {
    let block_routes = Router::new()
        .route(
            "/",
            get(content_block::list_by_lesson).post(content_block::create),
        )
        .route("/reorder", put(content_block::reorder))
        .route(
            "/{id}",
            get(content_block::get_by_id)
                .put(content_block::update)
                .delete(content_block::delete),
        );

    Router::new().nest("/{lesson_id}/blocks", block_routes)
}
