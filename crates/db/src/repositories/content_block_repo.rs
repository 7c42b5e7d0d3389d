//! Repository for the `content_blocks` table.

use etude_core::content::BlockContent;
use etude_core::ordering::validate_reorder;
use etude_core::types::DbId;
use etude_core::CoreError;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::content_block::ContentBlock;
use crate::repositories::{is_sort_conflict, APPEND_RETRIES};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, lesson_id, content, sort_order, created_at";

/// Provides CRUD and ordering operations for content blocks.
pub struct ContentBlockRepo;

impl ContentBlockRepo {
    /// Append a new block at the end of the lesson, returning the row.
    ///
    /// The sort order is computed inside the INSERT; a lost append race
    /// recomputes and retries.
    pub async fn create(
        pool: &PgPool,
        lesson_id: DbId,
        content: &BlockContent,
    ) -> Result<ContentBlock, sqlx::Error> {
        let query = format!(
            "INSERT INTO content_blocks (lesson_id, content, sort_order)
             VALUES (
                $1, $2,
                (SELECT COALESCE(MAX(sort_order), -1) + 1 FROM content_blocks WHERE lesson_id = $1)
             )
             RETURNING {COLUMNS}"
        );
        let mut attempts = 0;
        loop {
            match sqlx::query_as::<_, ContentBlock>(&query)
                .bind(lesson_id)
                .bind(Json(content))
                .fetch_one(pool)
                .await
            {
                Ok(block) => return Ok(block),
                Err(err) if attempts < APPEND_RETRIES && is_sort_conflict(&err) => {
                    attempts += 1;
                    tracing::debug!(%lesson_id, attempts, "block append lost a sort-order race, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Find a block by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ContentBlock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_blocks WHERE id = $1");
        sqlx::query_as::<_, ContentBlock>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a block by ID within a lesson.
    pub async fn find_in_lesson(
        pool: &PgPool,
        lesson_id: DbId,
        id: DbId,
    ) -> Result<Option<ContentBlock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_blocks WHERE id = $1 AND lesson_id = $2");
        sqlx::query_as::<_, ContentBlock>(&query)
            .bind(id)
            .bind(lesson_id)
            .fetch_optional(pool)
            .await
    }

    /// List all blocks of a lesson, ascending by sort order.
    pub async fn list_by_lesson(
        pool: &PgPool,
        lesson_id: DbId,
    ) -> Result<Vec<ContentBlock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_blocks
             WHERE lesson_id = $1
             ORDER BY sort_order ASC"
        );
        sqlx::query_as::<_, ContentBlock>(&query)
            .bind(lesson_id)
            .fetch_all(pool)
            .await
    }

    /// Batch-load blocks for a set of lessons, ascending by sort order
    /// within each lesson.
    pub async fn list_by_lessons(
        pool: &PgPool,
        lesson_ids: &[DbId],
    ) -> Result<Vec<ContentBlock>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_blocks
             WHERE lesson_id = ANY($1)
             ORDER BY lesson_id, sort_order ASC"
        );
        sqlx::query_as::<_, ContentBlock>(&query)
            .bind(lesson_ids)
            .fetch_all(pool)
            .await
    }

    /// Replace a block's payload. The new payload's type tag must match
    /// the stored one; blocks never change type in place.
    ///
    /// Returns `None` if no row with the given `id` exists in the lesson,
    /// and a conflict if the row exists with a different type.
    pub async fn update_content(
        pool: &PgPool,
        lesson_id: DbId,
        id: DbId,
        content: &BlockContent,
    ) -> Result<Option<ContentBlock>, RepoError> {
        let query = format!(
            "UPDATE content_blocks SET content = $3
             WHERE id = $1 AND lesson_id = $2 AND content->>'type' = $4
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ContentBlock>(&query)
            .bind(id)
            .bind(lesson_id)
            .bind(Json(content))
            .bind(content.kind())
            .fetch_optional(pool)
            .await?;
        if updated.is_some() {
            return Ok(updated);
        }

        // Nothing matched: either the row is gone or its type differs.
        match Self::find_in_lesson(pool, lesson_id, id).await? {
            Some(existing) => Err(CoreError::Conflict(format!(
                "Content block type cannot change from '{}' to '{}'",
                existing.content.kind(),
                content.kind()
            ))
            .into()),
            None => Ok(None),
        }
    }

    /// Permanently delete a block. Sibling sort orders keep their gaps.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, lesson_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM content_blocks WHERE id = $1 AND lesson_id = $2")
            .bind(id)
            .bind(lesson_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Rewrite the order of all blocks in a lesson in one transaction.
    ///
    /// Same contract as section reordering: `ids` must match the current
    /// siblings exactly and rows get dense orders 0..n-1.
    pub async fn reorder(
        pool: &PgPool,
        lesson_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<ContentBlock>, RepoError> {
        let mut tx = pool.begin().await?;

        let current: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM content_blocks WHERE lesson_id = $1 ORDER BY sort_order FOR UPDATE",
        )
        .bind(lesson_id)
        .fetch_all(&mut *tx)
        .await?;
        let current: Vec<DbId> = current.into_iter().map(|row| row.0).collect();
        validate_reorder(&current, ids)?;

        if !ids.is_empty() {
            sqlx::query("SET CONSTRAINTS uq_content_blocks_lesson_sort DEFERRED")
                .execute(&mut *tx)
                .await?;
            let positions: Vec<i32> = (0..ids.len() as i32).collect();
            sqlx::query(
                "UPDATE content_blocks SET sort_order = new_order.position
                 FROM (SELECT * FROM UNNEST($2::uuid[], $3::int[])) AS new_order(id, position)
                 WHERE content_blocks.id = new_order.id AND content_blocks.lesson_id = $1",
            )
            .bind(lesson_id)
            .bind(ids)
            .bind(&positions)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM content_blocks
             WHERE lesson_id = $1
             ORDER BY sort_order ASC"
        );
        let reordered = sqlx::query_as::<_, ContentBlock>(&query)
            .bind(lesson_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(reordered)
    }
}
