//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod content_block;
pub mod course;
pub mod lesson;
pub mod pricing_plan;
pub mod section;

pub use content_block::{ContentBlock, CreateContentBlock, UpdateContentBlock};
pub use course::{Course, CreateCourse, UpdateCourse};
pub use lesson::{CreateLesson, Lesson, UpdateLesson};
pub use pricing_plan::{CreatePricingPlan, PricingPlan, UpdatePricingPlan};
pub use section::{CreateSection, Section, SectionSummary, UpdateSection};
