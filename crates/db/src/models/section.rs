//! Section entity model and DTOs.
//!
//! Sections are the ordered modules of a course; `sort_order` is assigned
//! on append and rewritten densely on reorder.

use etude_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Section {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

/// DTO for creating a new section. The sort order is assigned by the
/// repository, never by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSection {
    pub title: String,
}

/// DTO for updating an existing section.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSection {
    pub title: Option<String>,
}

/// Aggregated section row for the sales page curriculum preview.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SectionSummary {
    pub id: DbId,
    pub title: String,
    pub sort_order: i32,
    pub lesson_count: i64,
    pub total_duration_secs: i64,
}
