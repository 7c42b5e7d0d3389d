//! Course entity model and DTOs.

use etude_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub published: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a new course.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Defaults to `false` (draft) if omitted.
    pub published: Option<bool>,
}

/// DTO for updating an existing course. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub published: Option<bool>,
}
