//! Handlers for the `/blocks` resource.
//!
//! Content blocks are nested under lessons:
//! `/lessons/{lesson_id}/blocks[/{id}]`
//!
//! Creation takes only a block type and starts from that type's empty
//! payload; updates replace the payload but may not change the type.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use etude_core::content::{BlockContent, VALID_BLOCK_TYPES};
use etude_core::error::CoreError;
use etude_core::types::DbId;
use etude_db::models::content_block::{ContentBlock, CreateContentBlock, UpdateContentBlock};
use etude_db::repositories::{ContentBlockRepo, LessonRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::ReorderRequest;
use crate::state::AppState;

/// POST /api/v1/lessons/{lesson_id}/blocks
///
/// Body carries only `{"type": "..."}`; the block is appended with the
/// empty payload for that type and filled in by later updates.
pub async fn create(
    State(state): State<AppState>,
    Path(lesson_id): Path<DbId>,
    Json(input): Json<CreateContentBlock>,
) -> AppResult<(StatusCode, Json<ContentBlock>)> {
    let content = BlockContent::empty(&input.kind).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown content block type '{}'. Valid types: {}",
            input.kind,
            VALID_BLOCK_TYPES.join(", ")
        )))
    })?;
    require_lesson(&state, lesson_id).await?;
    let block = ContentBlockRepo::create(&state.pool, lesson_id, &content).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// GET /api/v1/lessons/{lesson_id}/blocks
///
/// Blocks are returned in display order.
pub async fn list_by_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<DbId>,
) -> AppResult<Json<Vec<ContentBlock>>> {
    let blocks = ContentBlockRepo::list_by_lesson(&state.pool, lesson_id).await?;
    Ok(Json(blocks))
}

/// GET /api/v1/lessons/{lesson_id}/blocks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((lesson_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<ContentBlock>> {
    let block = ContentBlockRepo::find_in_lesson(&state.pool, lesson_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ContentBlock",
            id,
        }))?;
    Ok(Json(block))
}

/// PUT /api/v1/lessons/{lesson_id}/blocks/{id}
///
/// Replaces the block's payload. The payload's type must match the
/// block's existing type; a mismatch is a conflict, since the client is
/// acting on a stale view of the block.
pub async fn update(
    State(state): State<AppState>,
    Path((lesson_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateContentBlock>,
) -> AppResult<Json<ContentBlock>> {
    let block = ContentBlockRepo::update_content(&state.pool, lesson_id, id, &input.content)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ContentBlock",
            id,
        }))?;
    Ok(Json(block))
}

/// DELETE /api/v1/lessons/{lesson_id}/blocks/{id}
///
/// Leaves a gap in the lesson's order.
pub async fn delete(
    State(state): State<AppState>,
    Path((lesson_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let deleted = ContentBlockRepo::delete(&state.pool, lesson_id, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "ContentBlock",
            id,
        }))
    }
}

/// PUT /api/v1/lessons/{lesson_id}/blocks/reorder
pub async fn reorder(
    State(state): State<AppState>,
    Path(lesson_id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<Json<Vec<ContentBlock>>> {
    let blocks = ContentBlockRepo::reorder(&state.pool, lesson_id, &input.ids).await?;
    Ok(Json(blocks))
}

/// 404 unless the parent lesson exists.
async fn require_lesson(state: &AppState, lesson_id: DbId) -> AppResult<()> {
    LessonRepo::find_by_id(&state.pool, lesson_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id: lesson_id,
        }))?;
    Ok(())
}
