//! Repository for the `pricing_plans` table.

use etude_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::pricing_plan::{CreatePricingPlan, PricingPlan, UpdatePricingPlan};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, title, price_cents, currency, features, \
    is_popular, created_at";

/// Provides CRUD operations for pricing plans.
pub struct PricingPlanRepo;

impl PricingPlanRepo {
    /// Insert a new pricing plan, returning the created row.
    ///
    /// `currency` defaults to `'USD'`, `features` to an empty list, and
    /// `is_popular` to `false`.
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        input: &CreatePricingPlan,
    ) -> Result<PricingPlan, sqlx::Error> {
        let query = format!(
            "INSERT INTO pricing_plans
                (course_id, title, price_cents, currency, features, is_popular)
             VALUES ($1, $2, $3, COALESCE($4, 'USD'), COALESCE($5, '[]'::jsonb), COALESCE($6, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PricingPlan>(&query)
            .bind(course_id)
            .bind(&input.title)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(input.features.as_ref().map(Json))
            .bind(input.is_popular)
            .fetch_one(pool)
            .await
    }

    /// Find a plan by ID within a course.
    pub async fn find_in_course(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
    ) -> Result<Option<PricingPlan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pricing_plans WHERE id = $1 AND course_id = $2");
        sqlx::query_as::<_, PricingPlan>(&query)
            .bind(id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// List all plans of a course for the sales page: popular plans
    /// first, then cheapest to dearest.
    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<PricingPlan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pricing_plans
             WHERE course_id = $1
             ORDER BY is_popular DESC, price_cents ASC"
        );
        sqlx::query_as::<_, PricingPlan>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Update a plan. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists in the course.
    pub async fn update(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
        input: &UpdatePricingPlan,
    ) -> Result<Option<PricingPlan>, sqlx::Error> {
        let query = format!(
            "UPDATE pricing_plans SET
                title = COALESCE($3, title),
                price_cents = COALESCE($4, price_cents),
                currency = COALESCE($5, currency),
                features = COALESCE($6, features),
                is_popular = COALESCE($7, is_popular)
             WHERE id = $1 AND course_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PricingPlan>(&query)
            .bind(id)
            .bind(course_id)
            .bind(&input.title)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(input.features.as_ref().map(Json))
            .bind(input.is_popular)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a plan. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, course_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pricing_plans WHERE id = $1 AND course_id = $2")
            .bind(id)
            .bind(course_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
