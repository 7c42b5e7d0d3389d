//! Pricing plan entity model and DTOs.

use etude_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `pricing_plans` table. Prices are integer cents.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PricingPlan {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub price_cents: i32,
    pub currency: String,
    #[sqlx(json)]
    pub features: Vec<String>,
    pub is_popular: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a pricing plan.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePricingPlan {
    pub title: String,
    pub price_cents: i32,
    /// Defaults to `'USD'` if omitted.
    pub currency: Option<String>,
    /// Defaults to an empty list.
    pub features: Option<Vec<String>>,
    /// Defaults to `false`.
    pub is_popular: Option<bool>,
}

/// DTO for updating a pricing plan. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePricingPlan {
    pub title: Option<String>,
    pub price_cents: Option<i32>,
    pub currency: Option<String>,
    pub features: Option<Vec<String>>,
    pub is_popular: Option<bool>,
}
