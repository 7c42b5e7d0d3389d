//! Handlers for the `/lessons` resource.
//!
//! Lessons are nested under sections:
//! `/sections/{section_id}/lessons[/{id}]`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use etude_core::curriculum::validate_title;
use etude_core::error::CoreError;
use etude_core::types::DbId;
use etude_db::models::lesson::{CreateLesson, Lesson, UpdateLesson};
use etude_db::repositories::{LessonRepo, SectionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::ReorderRequest;
use crate::state::AppState;

/// POST /api/v1/sections/{section_id}/lessons
///
/// Appends the new lesson after the section's current last lesson.
pub async fn create(
    State(state): State<AppState>,
    Path(section_id): Path<DbId>,
    Json(input): Json<CreateLesson>,
) -> AppResult<(StatusCode, Json<Lesson>)> {
    validate_title(&input.title)?;
    require_section(&state, section_id).await?;
    let lesson = LessonRepo::create(&state.pool, section_id, &input).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// GET /api/v1/sections/{section_id}/lessons
///
/// Lessons are returned in display order.
pub async fn list_by_section(
    State(state): State<AppState>,
    Path(section_id): Path<DbId>,
) -> AppResult<Json<Vec<Lesson>>> {
    let lessons = LessonRepo::list_by_section(&state.pool, section_id).await?;
    Ok(Json(lessons))
}

/// GET /api/v1/sections/{section_id}/lessons/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((section_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Lesson>> {
    let lesson = LessonRepo::find_in_section(&state.pool, section_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }))?;
    Ok(Json(lesson))
}

/// PUT /api/v1/sections/{section_id}/lessons/{id}
///
/// Absent fields keep their current values; this is how the upload flow
/// attaches `video_id` without touching the rest of the lesson.
pub async fn update(
    State(state): State<AppState>,
    Path((section_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateLesson>,
) -> AppResult<Json<Lesson>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    let lesson = LessonRepo::update(&state.pool, section_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }))?;
    Ok(Json(lesson))
}

/// DELETE /api/v1/sections/{section_id}/lessons/{id}
///
/// Cascades to the lesson's content blocks and leaves a gap in the
/// section's order.
pub async fn delete(
    State(state): State<AppState>,
    Path((section_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let deleted = LessonRepo::delete(&state.pool, section_id, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }))
    }
}

/// PUT /api/v1/sections/{section_id}/lessons/reorder
pub async fn reorder(
    State(state): State<AppState>,
    Path(section_id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<Json<Vec<Lesson>>> {
    let lessons = LessonRepo::reorder(&state.pool, section_id, &input.ids).await?;
    Ok(Json(lessons))
}

/// 404 unless the parent section exists.
async fn require_section(state: &AppState, section_id: DbId) -> AppResult<()> {
    SectionRepo::find_by_id(&state.pool, section_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id: section_id,
        }))?;
    Ok(())
}
