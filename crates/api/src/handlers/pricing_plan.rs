//! Handlers for the `/plans` resource.
//!
//! Pricing plans are nested under courses:
//! `/courses/{course_id}/plans[/{id}]`
//!
//! Plans are not an ordered collection. The sales page sorts them by
//! popularity and price, so there is no reorder endpoint here.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use etude_core::curriculum::{validate_currency, validate_price_cents, validate_title};
use etude_core::error::CoreError;
use etude_core::types::DbId;
use etude_db::models::pricing_plan::{CreatePricingPlan, PricingPlan, UpdatePricingPlan};
use etude_db::repositories::{CourseRepo, PricingPlanRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/courses/{course_id}/plans
pub async fn create(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(input): Json<CreatePricingPlan>,
) -> AppResult<(StatusCode, Json<PricingPlan>)> {
    validate_title(&input.title)?;
    validate_price_cents(input.price_cents)?;
    if let Some(currency) = &input.currency {
        validate_currency(currency)?;
    }
    require_course(&state, course_id).await?;
    let plan = PricingPlanRepo::create(&state.pool, course_id, &input).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// GET /api/v1/courses/{course_id}/plans
///
/// Popular plans first, then cheapest to dearest.
pub async fn list_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<Vec<PricingPlan>>> {
    let plans = PricingPlanRepo::list_by_course(&state.pool, course_id).await?;
    Ok(Json(plans))
}

/// GET /api/v1/courses/{course_id}/plans/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<PricingPlan>> {
    let plan = PricingPlanRepo::find_in_course(&state.pool, course_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PricingPlan",
            id,
        }))?;
    Ok(Json(plan))
}

/// PUT /api/v1/courses/{course_id}/plans/{id}
pub async fn update(
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdatePricingPlan>,
) -> AppResult<Json<PricingPlan>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(price_cents) = input.price_cents {
        validate_price_cents(price_cents)?;
    }
    if let Some(currency) = &input.currency {
        validate_currency(currency)?;
    }
    let plan = PricingPlanRepo::update(&state.pool, course_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "PricingPlan",
            id,
        }))?;
    Ok(Json(plan))
}

/// DELETE /api/v1/courses/{course_id}/plans/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((course_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let deleted = PricingPlanRepo::delete(&state.pool, course_id, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "PricingPlan",
            id,
        }))
    }
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
