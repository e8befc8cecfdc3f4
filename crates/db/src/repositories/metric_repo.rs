//! Repository for the `sdqa_metric` table.

use std::collections::HashMap;

use sdqa_core::error::CoreError;
use sdqa_core::metric::DataType;
use sdqa_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::metric::{CreateMetric, MetricRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, metric_name, physical_units, data_type, definition, created_at";

pub struct MetricRepo;

impl MetricRepo {
    /// Register a metric, returning the stored row. An `INVALID` data type
    /// is rejected before insert.
    pub async fn create(pool: &PgPool, body: &CreateMetric) -> Result<MetricRow, DbError> {
        if body.data_type == DataType::Invalid {
            return Err(CoreError::InvalidArgument(format!(
                "metric '{}' must have data type FLOAT or INT",
                body.metric_name
            ))
            .into());
        }
        let query = format!(
            "INSERT INTO sdqa_metric (metric_name, physical_units, data_type, definition)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, MetricRow>(&query)
            .bind(&body.metric_name)
            .bind(&body.physical_units)
            .bind(body.data_type.code())
            .bind(&body.definition)
            .fetch_one(pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MetricRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sdqa_metric WHERE id = $1");
        sqlx::query_as::<_, MetricRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(
        pool: &PgPool,
        metric_name: &str,
    ) -> Result<Option<MetricRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sdqa_metric WHERE metric_name = $1");
        sqlx::query_as::<_, MetricRow>(&query)
            .bind(metric_name)
            .fetch_optional(pool)
            .await
    }

    /// List all metrics ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<MetricRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sdqa_metric ORDER BY metric_name");
        sqlx::query_as::<_, MetricRow>(&query).fetch_all(pool).await
    }

    /// Map every metric name to its id.
    pub async fn ids_by_name(pool: &PgPool) -> Result<HashMap<String, DbId>, sqlx::Error> {
        let rows: Vec<(DbId, String)> = sqlx::query_as("SELECT id, metric_name FROM sdqa_metric")
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|(id, name)| (name, id)).collect())
    }

    /// Delete a metric by id. Its thresholds are removed by cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sdqa_metric WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
