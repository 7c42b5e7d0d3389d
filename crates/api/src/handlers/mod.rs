//! Request handlers for the curriculum and upload endpoints.
//!
//! Each submodule provides async handler functions (create, list,
//! get_by_id, update, delete, reorder) for a single resource. Handlers
//! delegate to the corresponding repository in `etude_db` and map errors
//! via [`AppError`](crate::error::AppError).

pub mod content_block;
pub mod course;
pub mod course_tree;
pub mod lesson;
pub mod pricing_plan;
pub mod section;
pub mod uploads;

/// Body for the sibling reorder endpoints: the complete set of child ids
/// in their desired order.
#[derive(Debug, serde::Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<etude_core::types::DbId>,
}
