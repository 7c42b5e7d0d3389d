//! Route definitions for the `/courses` resource.
//!
//! Also nests section and pricing plan routes under
//! `/courses/{course_id}/...` and exposes the aggregate tree and sales
//! page reads.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{course, course_tree, pricing_plan, section};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
///
/// GET    /{course_id}/tree                  -> get_tree
/// GET    /{course_id}/sales                 -> get_sales_page
///
/// GET    /{course_id}/sections              -> list_by_course
/// POST   /{course_id}/sections              -> create (appends)
/// PUT    /{course_id}/sections/reorder      -> reorder
/// GET    /{course_id}/sections/{id}         -> get_by_id
/// PUT    /{course_id}/sections/{id}         -> update
/// DELETE /{course_id}/sections/{id}         -> delete
///
/// GET    /{course_id}/plans                 -> list_by_course
/// POST   /{course_id}/plans                 -> create
/// GET    /{course_id}/plans/{id}            -> get_by_id
/// PUT    /{course_id}/plans/{id}            -> update
/// DELETE /{course_id}/plans/{id}            -> delete
/// ```
pub fn router() -> Router<AppState> {
    let section_routes = Router::new()
        .route("/", get(section::list_by_course).post(section::create))
        .route("/reorder", put(section::reorder))
        .route(
            "/{id}",
            get(section::get_by_id)
                .put(section::update)
                .delete(section::delete),
        );

    let plan_routes = Router::new()
        .route(
            "/",
            get(pricing_plan::list_by_course).post(pricing_plan::create),
        )
        .route(
            "/{id}",
            get(pricing_plan::get_by_id)
                .put(pricing_plan::update)
                .delete(pricing_plan::delete),
        );

    Router::new()
        .route("/", get(course::list).post(course::create))
        .route(
            "/{id}",
            get(course::get_by_id)
                .put(course::update)
                .delete(course::delete),
        )
        .route("/{course_id}/tree", get(course_tree::get_tree))
        .route("/{course_id}/sales", get(course_tree::get_sales_page))
        .nest("/{course_id}/sections", section_routes)
        .nest("/{course_id}/plans", plan_routes)
}
