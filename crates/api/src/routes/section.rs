//! Route definitions for section-scoped sub-resources.
//!
//! These routes are mounted at `/sections` and provide access to the
//! lessons that belong to a specific section.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::lesson;
use crate::state::AppState;

/// Routes mounted at `/sections`.
///
/// ```text
/// GET    /{section_id}/lessons               list_by_section
/// POST   /{section_id}/lessons               create (appends)
/// PUT    /{section_id}/lessons/reorder       reorder
/// GET    /{section_id}/lessons/{id}          get_by_id
/// PUT    /{section_id}/lessons/{id}          update
/// DELETE /{section_id}/lessons/{id}          delete
/// ```
pub fn router() -> Router<AppState> {
    let lesson_routes = Router::new()
        .route("/", get(lesson::list_by_section).post(lesson::create))
        .route("/reorder", put(lesson::reorder))
        .route(
            "/{id}",
            get(lesson::get_by_id)
                .put(lesson::update)
                .delete(lesson::delete),
        );

    Router::new().nest("/{section_id}/lessons", lesson_routes)
}
