//! Content block entity model and DTOs.

use etude_core::content::BlockContent;
use etude_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `content_blocks` table.
///
/// The payload is flattened on serialization, so the wire shape is
/// `{"id", "lesson_id", "type", "content", "sort_order", "created_at"}`,
/// the same tagged form the `content` jsonb column stores.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentBlock {
    pub id: DbId,
    pub lesson_id: DbId,
    #[sqlx(json)]
    #[serde(flatten)]
    pub content: BlockContent,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

/// DTO for appending a block. The payload starts as the type's empty
/// default; authors fill it in afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
}

/// DTO for replacing a block's payload. The type tag must match the
/// stored payload; blocks never change type in place.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateContentBlock {
    #[serde(flatten)]
    pub content: BlockContent,
}
