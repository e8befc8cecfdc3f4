//! Repository for the `sdqa_threshold` table.

use std::collections::HashMap;

use sdqa_core::threshold::validate_bounds;
use sdqa_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::threshold::{CreateThreshold, ThresholdRow};

const COLUMNS: &str = "id, sdqa_metric_id, upper_threshold, lower_threshold, created_date";

pub struct ThresholdRepo;

impl ThresholdRepo {
    /// Add a threshold for a metric. Bounds are validated before insert.
    pub async fn create(pool: &PgPool, body: &CreateThreshold) -> Result<ThresholdRow, DbError> {
        validate_bounds(body.lower_threshold, body.upper_threshold)?;
        let query = format!(
            "INSERT INTO sdqa_threshold (sdqa_metric_id, upper_threshold, lower_threshold)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ThresholdRow>(&query)
            .bind(body.sdqa_metric_id)
            .bind(body.upper_threshold)
            .bind(body.lower_threshold)
            .fetch_one(pool)
            .await?;
        Ok(row)
    }

    /// All thresholds ever set for a metric, newest first.
    pub async fn list_for_metric(
        pool: &PgPool,
        metric_id: DbId,
    ) -> Result<Vec<ThresholdRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sdqa_threshold
             WHERE sdqa_metric_id = $1
             ORDER BY created_date DESC, id DESC"
        );
        sqlx::query_as::<_, ThresholdRow>(&query)
            .bind(metric_id)
            .fetch_all(pool)
            .await
    }

    /// The threshold currently in force for a metric (the newest one).
    pub async fn current_for_metric(
        pool: &PgPool,
        metric_id: DbId,
    ) -> Result<Option<ThresholdRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sdqa_threshold
             WHERE sdqa_metric_id = $1
             ORDER BY created_date DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ThresholdRow>(&query)
            .bind(metric_id)
            .fetch_optional(pool)
            .await
    }

    /// Map each metric id to the id of its current threshold.
    pub async fn current_ids_by_metric(
        pool: &PgPool,
    ) -> Result<HashMap<DbId, DbId>, sqlx::Error> {
        let rows: Vec<(DbId, DbId)> = sqlx::query_as(
            "SELECT DISTINCT ON (sdqa_metric_id) sdqa_metric_id, id
             FROM sdqa_threshold
             ORDER BY sdqa_metric_id, created_date DESC, id DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
