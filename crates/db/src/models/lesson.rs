//! Lesson entity model and DTOs.

use etude_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `lessons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lesson {
    pub id: DbId,
    pub section_id: DbId,
    pub title: String,
    pub sort_order: i32,
    pub is_published: bool,
    pub is_free_preview: bool,
    /// Remote CDN video GUID, set when an upload handshake completes.
    pub video_id: Option<String>,
    pub duration_secs: Option<i32>,
    pub created_at: Timestamp,
}

/// DTO for creating a new lesson. The sort order is assigned by the
/// repository, never by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLesson {
    pub title: String,
}

/// DTO for updating an existing lesson. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLesson {
    pub title: Option<String>,
    pub is_published: Option<bool>,
    pub is_free_preview: Option<bool>,
    pub video_id: Option<String>,
    pub duration_secs: Option<i32>,
}
