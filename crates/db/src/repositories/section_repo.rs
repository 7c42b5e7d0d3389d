//! Repository for the `sections` table.

use etude_core::ordering::validate_reorder;
use etude_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::section::{CreateSection, Section, SectionSummary, UpdateSection};
use crate::repositories::{is_sort_conflict, APPEND_RETRIES};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, course_id, title, sort_order, created_at";

/// Provides CRUD and ordering operations for sections.
pub struct SectionRepo;

impl SectionRepo {
    /// Append a new section at the end of the course, returning the row.
    ///
    /// The sort order is computed inside the INSERT (max + 1, or 0 for the
    /// first section) so two concurrent appends never read the same value
    /// app-side; a loser of the unique-constraint race recomputes and
    /// retries.
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateSection,
    ) -> Result<Section, sqlx::Error> {
        let query = format!(
            "INSERT INTO sections (course_id, title, sort_order)
             VALUES (
                $1, $2,
                (SELECT COALESCE(MAX(sort_order), -1) + 1 FROM sections WHERE course_id = $1)
             )
             RETURNING {COLUMNS}"
        );
        let mut attempts = 0;
        loop {
            match sqlx::query_as::<_, Section>(&query)
                .bind(course_id)
                .bind(&input.title)
                .fetch_one(pool)
                .await
            {
                Ok(section) => return Ok(section),
                Err(err) if attempts < APPEND_RETRIES && is_sort_conflict(&err) => {
                    attempts += 1;
                    tracing::debug!(%course_id, attempts, "section append lost a sort-order race, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Find a section by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Section>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sections WHERE id = $1");
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a section by ID within a course.
    pub async fn find_in_course(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
    ) -> Result<Option<Section>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sections WHERE id = $1 AND course_id = $2");
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// List all sections of a course, ascending by sort order.
    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<Section>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sections
             WHERE course_id = $1
             ORDER BY sort_order ASC"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Per-section lesson counts and total durations for a course, for
    /// the sales page curriculum preview. Ascending by sort order.
    pub async fn list_with_stats(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<SectionSummary>, sqlx::Error> {
        sqlx::query_as::<_, SectionSummary>(
            "SELECT s.id, s.title, s.sort_order,
                    COUNT(l.id) AS lesson_count,
                    COALESCE(SUM(l.duration_secs), 0)::BIGINT AS total_duration_secs
             FROM sections s
             LEFT JOIN lessons l ON l.section_id = s.id
             WHERE s.course_id = $1
             GROUP BY s.id, s.title, s.sort_order
             ORDER BY s.sort_order ASC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }

    /// Update a section. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists in the course.
    pub async fn update(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
        input: &UpdateSection,
    ) -> Result<Option<Section>, sqlx::Error> {
        let query = format!(
            "UPDATE sections SET title = COALESCE($3, title)
             WHERE id = $1 AND course_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .bind(course_id)
            .bind(&input.title)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a section; its lessons and their content blocks
    /// are removed by FK cascade. Sibling sort orders are left untouched,
    /// gaps included. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, course_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1 AND course_id = $2")
            .bind(id)
            .bind(course_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Rewrite the order of all sections in a course in one transaction.
    ///
    /// `ids` must name exactly the course's current sections; rows are
    /// assigned dense orders 0..n-1 in request sequence. The per-course
    /// unique constraint is deferred inside the transaction so the single
    /// UPDATE may permute freely; a validation failure rolls back with
    /// nothing written.
    pub async fn reorder(
        pool: &PgPool,
        course_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<Section>, RepoError> {
        let mut tx = pool.begin().await?;

        let current: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM sections WHERE course_id = $1 ORDER BY sort_order FOR UPDATE",
        )
        .bind(course_id)
        .fetch_all(&mut *tx)
        .await?;
        let current: Vec<DbId> = current.into_iter().map(|row| row.0).collect();
        validate_reorder(&current, ids)?;

        if !ids.is_empty() {
            sqlx::query("SET CONSTRAINTS uq_sections_course_sort DEFERRED")
                .execute(&mut *tx)
                .await?;
            let positions: Vec<i32> = (0..ids.len() as i32).collect();
            sqlx::query(
                "UPDATE sections SET sort_order = new_order.position
                 FROM (SELECT * FROM UNNEST($2::uuid[], $3::int[])) AS new_order(id, position)
                 WHERE sections.id = new_order.id AND sections.course_id = $1",
            )
            .bind(course_id)
            .bind(ids)
            .bind(&positions)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM sections
             WHERE course_id = $1
             ORDER BY sort_order ASC"
        );
        let reordered = sqlx::query_as::<_, Section>(&query)
            .bind(course_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(reordered)
    }
}
