//! Repository for the `lessons` table.

use etude_core::ordering::validate_reorder;
use etude_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::lesson::{CreateLesson, Lesson, UpdateLesson};
use crate::repositories::{is_sort_conflict, APPEND_RETRIES};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, section_id, title, sort_order, is_published, \
    is_free_preview, video_id, duration_secs, created_at";

/// Provides CRUD and ordering operations for lessons.
pub struct LessonRepo;

impl LessonRepo {
    /// Append a new lesson at the end of the section, returning the row.
    ///
    /// New lessons start unpublished with no video attached. The sort
    /// order is computed inside the INSERT; a lost append race recomputes
    /// and retries.
    pub async fn create(
        pool: &PgPool,
        section_id: DbId,
        input: &CreateLesson,
    ) -> Result<Lesson, sqlx::Error> {
        let query = format!(
            "INSERT INTO lessons (section_id, title, sort_order)
             VALUES (
                $1, $2,
                (SELECT COALESCE(MAX(sort_order), -1) + 1 FROM lessons WHERE section_id = $1)
             )
             RETURNING {COLUMNS}"
        );
        let mut attempts = 0;
        loop {
            match sqlx::query_as::<_, Lesson>(&query)
                .bind(section_id)
                .bind(&input.title)
                .fetch_one(pool)
                .await
            {
                Ok(lesson) => return Ok(lesson),
                Err(err) if attempts < APPEND_RETRIES && is_sort_conflict(&err) => {
                    attempts += 1;
                    tracing::debug!(%section_id, attempts, "lesson append lost a sort-order race, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Find a lesson by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a lesson by ID within a section.
    pub async fn find_in_section(
        pool: &PgPool,
        section_id: DbId,
        id: DbId,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1 AND section_id = $2");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .bind(section_id)
            .fetch_optional(pool)
            .await
    }

    /// List all lessons of a section, ascending by sort order.
    pub async fn list_by_section(
        pool: &PgPool,
        section_id: DbId,
    ) -> Result<Vec<Lesson>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lessons
             WHERE section_id = $1
             ORDER BY sort_order ASC"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(section_id)
            .fetch_all(pool)
            .await
    }

    /// Batch-load lessons for a set of sections, ascending by sort order
    /// within each section. With `published_only`, drafts are filtered
    /// out (the student viewer's read).
    pub async fn list_by_sections(
        pool: &PgPool,
        section_ids: &[DbId],
        published_only: bool,
    ) -> Result<Vec<Lesson>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lessons
             WHERE section_id = ANY($1) AND (NOT $2 OR is_published)
             ORDER BY section_id, sort_order ASC"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(section_ids)
            .bind(published_only)
            .fetch_all(pool)
            .await
    }

    /// Update a lesson. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists in the section.
    pub async fn update(
        pool: &PgPool,
        section_id: DbId,
        id: DbId,
        input: &UpdateLesson,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!(
            "UPDATE lessons SET
                title = COALESCE($3, title),
                is_published = COALESCE($4, is_published),
                is_free_preview = COALESCE($5, is_free_preview),
                video_id = COALESCE($6, video_id),
                duration_secs = COALESCE($7, duration_secs)
             WHERE id = $1 AND section_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .bind(section_id)
            .bind(&input.title)
            .bind(input.is_published)
            .bind(input.is_free_preview)
            .bind(&input.video_id)
            .bind(input.duration_secs)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a lesson; its content blocks are removed by FK
    /// cascade. Sibling sort orders keep their gaps.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, section_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1 AND section_id = $2")
            .bind(id)
            .bind(section_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Rewrite the order of all lessons in a section in one transaction.
    ///
    /// Same contract as section reordering: `ids` must match the current
    /// siblings exactly and rows get dense orders 0..n-1.
    pub async fn reorder(
        pool: &PgPool,
        section_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<Lesson>, RepoError> {
        let mut tx = pool.begin().await?;

        let current: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM lessons WHERE section_id = $1 ORDER BY sort_order FOR UPDATE",
        )
        .bind(section_id)
        .fetch_all(&mut *tx)
        .await?;
        let current: Vec<DbId> = current.into_iter().map(|row| row.0).collect();
        validate_reorder(&current, ids)?;

        if !ids.is_empty() {
            sqlx::query("SET CONSTRAINTS uq_lessons_section_sort DEFERRED")
                .execute(&mut *tx)
                .await?;
            let positions: Vec<i32> = (0..ids.len() as i32).collect();
            sqlx::query(
                "UPDATE lessons SET sort_order = new_order.position
                 FROM (SELECT * FROM UNNEST($2::uuid[], $3::int[])) AS new_order(id, position)
                 WHERE lessons.id = new_order.id AND lessons.section_id = $1",
            )
            .bind(section_id)
            .bind(ids)
            .bind(&positions)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM lessons
             WHERE section_id = $1
             ORDER BY sort_order ASC"
        );
        let reordered = sqlx::query_as::<_, Lesson>(&query)
            .bind(section_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(reordered)
    }
}
