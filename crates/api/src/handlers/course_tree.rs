//! Aggregate read models over a course.
//!
//! The authoring UI and the student viewer both want the whole
//! curriculum in one round trip, so these handlers batch-load each
//! level of the hierarchy and stitch the rows back into a tree in
//! memory. Three queries regardless of course size.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use etude_core::error::CoreError;
use etude_core::types::DbId;
use etude_db::models::content_block::ContentBlock;
use etude_db::models::course::Course;
use etude_db::models::lesson::Lesson;
use etude_db::models::pricing_plan::PricingPlan;
use etude_db::models::section::{Section, SectionSummary};
use etude_db::repositories::{
    ContentBlockRepo, CourseRepo, LessonRepo, PricingPlanRepo, SectionRepo,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TreeParams {
    /// When true, draft lessons are dropped (the student viewer's read).
    #[serde(default)]
    pub published_only: bool,
}

/// Full nested curriculum of one course.
#[derive(Debug, Serialize)]
pub struct CourseTree {
    #[serde(flatten)]
    pub course: Course,
    pub sections: Vec<SectionNode>,
}

#[derive(Debug, Serialize)]
pub struct SectionNode {
    #[serde(flatten)]
    pub section: Section,
    pub lessons: Vec<LessonNode>,
}

#[derive(Debug, Serialize)]
pub struct LessonNode {
    #[serde(flatten)]
    pub lesson: Lesson,
    /// Player URL for the lesson's video, when a video is attached and
    /// a library is configured.
    pub embed_url: Option<String>,
    pub blocks: Vec<ContentBlock>,
}

/// Everything the sales page renders.
#[derive(Debug, Serialize)]
pub struct SalesPage {
    pub course: Course,
    pub plans: Vec<PricingPlan>,
    pub curriculum: Vec<SectionSummary>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/courses/{id}/tree
///
/// Sections, lessons, and blocks each come back ascending by sort
/// order within their parent.
pub async fn get_tree(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Query(params): Query<TreeParams>,
) -> AppResult<Json<CourseTree>> {
    let course = CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;

    let sections = SectionRepo::list_by_course(&state.pool, course_id).await?;
    let section_ids: Vec<DbId> = sections.iter().map(|s| s.id).collect();
    let lessons =
        LessonRepo::list_by_sections(&state.pool, &section_ids, params.published_only).await?;
    let lesson_ids: Vec<DbId> = lessons.iter().map(|l| l.id).collect();
    let blocks = ContentBlockRepo::list_by_lessons(&state.pool, &lesson_ids).await?;

    // Rows arrive ordered within each parent, so pushing in row order
    // keeps every sibling list sorted.
    let mut blocks_by_lesson: HashMap<DbId, Vec<ContentBlock>> = HashMap::new();
    for block in blocks {
        blocks_by_lesson.entry(block.lesson_id).or_default().push(block);
    }

    let mut lessons_by_section: HashMap<DbId, Vec<LessonNode>> = HashMap::new();
    for lesson in lessons {
        let embed_url = match (&state.config.bunny.library_id, &lesson.video_id) {
            (Some(library_id), Some(video_id)) => Some(etude_bunny::embed_url(
                &state.config.bunny.embed_base,
                library_id,
                video_id,
            )),
            _ => None,
        };
        let blocks = blocks_by_lesson.remove(&lesson.id).unwrap_or_default();
        lessons_by_section
            .entry(lesson.section_id)
            .or_default()
            .push(LessonNode {
                lesson,
                embed_url,
                blocks,
            });
    }

    let sections = sections
        .into_iter()
        .map(|section| SectionNode {
            lessons: lessons_by_section.remove(&section.id).unwrap_or_default(),
            section,
        })
        .collect();

    Ok(Json(CourseTree { course, sections }))
}

/// GET /api/v1/courses/{id}/sales
pub async fn get_sales_page(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<SalesPage>> {
    let course = CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;
    let plans = PricingPlanRepo::list_by_course(&state.pool, course_id).await?;
    let curriculum = SectionRepo::list_with_stats(&state.pool, course_id).await?;

    Ok(Json(SalesPage {
        course,
        plans,
        curriculum,
    }))
}
