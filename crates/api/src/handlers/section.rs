//! Handlers for the `/sections` resource.
//!
//! Sections are nested under courses:
//! `/courses/{course_id}/sections[/{id}]`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use etude_core::curriculum::validate_title;
use etude_core::error::CoreError;
use etude_core::types::DbId;
use etude_db::models::section::{CreateSection, Section, UpdateSection};
use etude_db::repositories::{CourseRepo, SectionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::ReorderRequest;
use crate::state::AppState;

/// POST /api/v1/courses/{course_id}/sections
///
/// Appends the new section after the course's current last section.
pub async fn create(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<CreateSection>,
) -> AppResult<(StatusCode, Json<Section>)> {
    validate_title(&input.title)?;
    require_course(&state, course_id).await?;
    let section = SectionRepo::create(&state.pool, course_id, &input).await?;
    Ok((StatusCode::CREATED, Json(section)))
}

/// GET /api/v1/courses/{course_id}/sections
///
/// Sections are returned in display order.
pub async fn list_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<Vec<Section>>> {
    let sections = SectionRepo::list_by_course(&state.pool, course_id).await?;
    Ok(Json(sections))
}

/// GET /api/v1/courses/{course_id}/sections/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Section>> {
    let section = SectionRepo::find_in_course(&state.pool, course_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id,
        }))?;
    Ok(Json(section))
}

/// PUT /api/v1/courses/{course_id}/sections/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSection>,
) -> AppResult<Json<Section>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    let section = SectionRepo::update(&state.pool, course_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id,
        }))?;
    Ok(Json(section))
}

/// DELETE /api/v1/courses/{course_id}/sections/{id}
///
/// Cascades to the section's lessons and their content blocks. Sibling
/// positions are left untouched, so the course's order gains a gap.
pub async fn delete(
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let deleted = SectionRepo::delete(&state.pool, course_id, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id,
        }))
    }
}

/// PUT /api/v1/courses/{course_id}/sections/reorder
///
/// Takes the complete set of the course's section ids in the desired
/// order and rewrites positions to 0..n-1. A partial or mismatched id
/// set is rejected without moving anything.
pub async fn reorder(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<Json<Vec<Section>>> {
    let sections = SectionRepo::reorder(&state.pool, course_id, &input.ids).await?;
    Ok(Json(sections))
}

/// 404 unless the parent course exists.
async fn require_course(state: &AppState, course_id: DbId) -> AppResult<()> {
    CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;
    Ok(())
}
