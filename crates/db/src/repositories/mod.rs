//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Sections, lessons, and
//! content blocks share the ordered-sibling contract: appends compute the
//! next sort order inside the INSERT, reorders rewrite a whole sibling
//! group in one transaction.

pub mod content_block_repo;
pub mod course_repo;
pub mod lesson_repo;
pub mod pricing_plan_repo;
pub mod section_repo;

pub use content_block_repo::ContentBlockRepo;
pub use course_repo::CourseRepo;
pub use lesson_repo::LessonRepo;
pub use pricing_plan_repo::PricingPlanRepo;
pub use section_repo::SectionRepo;

/// How many times an append retries after losing a sort-order race to a
/// concurrent append on the same parent.
pub(crate) const APPEND_RETRIES: u32 = 3;

/// True when the error is a unique violation on one of the per-parent
/// `sort_order` constraints, i.e. a lost append race worth retrying.
pub(crate) fn is_sort_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint().is_some_and(|c| c.ends_with("_sort"))
        }
        _ => false,
    }
}
