//! Repository for the `sdqa_rating_for_science_*_exposure` tables.
//!
//! A rating set is written into the table of its scope's exposure level.
//! Metric names are resolved to `sdqa_metric` ids and each row is linked
//! to the metric's current threshold, if one exists.

use std::collections::HashMap;

use sdqa_core::persistence::{ExposureIds, ExposureLevel};
use sdqa_core::rating::{MetricValue, Rating, RatingScope, RatingSet};
use sdqa_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::rating::{rating_table, CreateRating, RatingRow};
use crate::repositories::{MetricRepo, ThresholdRepo};

pub struct RatingRepo;

impl RatingRepo {
    /// Insert resolved rows for one exposure level in a single transaction.
    pub async fn insert_rows(
        pool: &PgPool,
        level: ExposureLevel,
        rows: &[CreateRating],
    ) -> Result<u64, sqlx::Error> {
        let (table, parent_column) = rating_table(level);
        let query = format!(
            "INSERT INTO {table}
                (sdqa_metric_id, sdqa_threshold_id, {parent_column},
                 metric_value, metric_err, value_is_int, err_is_int)
             VALUES ($1, $2, $3, $4, $5, $6, $7)"
        );

        let mut tx = pool.begin().await?;
        let mut written = 0;
        for row in rows {
            written += sqlx::query(&query)
                .bind(row.sdqa_metric_id)
                .bind(row.sdqa_threshold_id)
                .bind(row.parent_exposure_id)
                .bind(row.metric_value)
                .bind(row.metric_err)
                .bind(row.value_is_int)
                .bind(row.err_is_int)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        Ok(written)
    }

    /// List the rows filed under one parent exposure.
    pub async fn list_for_exposure(
        pool: &PgPool,
        level: ExposureLevel,
        parent_exposure_id: DbId,
    ) -> Result<Vec<RatingRow>, sqlx::Error> {
        let (table, parent_column) = rating_table(level);
        let query = format!(
            "SELECT id, sdqa_metric_id, sdqa_threshold_id,
                    {parent_column} AS parent_exposure_id,
                    metric_value, metric_err, value_is_int, err_is_int, created_at
             FROM {table}
             WHERE {parent_column} = $1
             ORDER BY id"
        );
        sqlx::query_as::<_, RatingRow>(&query)
            .bind(parent_exposure_id)
            .fetch_all(pool)
            .await
    }

    /// Delete every row filed under one parent exposure.
    pub async fn delete_for_exposure(
        pool: &PgPool,
        level: ExposureLevel,
        parent_exposure_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let (table, parent_column) = rating_table(level);
        let query = format!("DELETE FROM {table} WHERE {parent_column} = $1");
        let result = sqlx::query(&query)
            .bind(parent_exposure_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Resolve and write a whole rating set. An empty set writes nothing.
    pub async fn persist_set(
        pool: &PgPool,
        ratings: &RatingSet,
        ids: &ExposureIds,
    ) -> Result<u64, DbError> {
        if ratings.is_empty() {
            return Ok(0);
        }
        let scope = ratings.scope()?;
        let parent_exposure_id = ids.parent_id_for(scope)?;
        let level = ExposureLevel::for_scope(scope)?;

        let metric_ids = MetricRepo::ids_by_name(pool).await?;
        let threshold_ids = ThresholdRepo::current_ids_by_metric(pool).await?;

        let rows = ratings
            .iter()
            .map(|rating| {
                let sdqa_metric_id = *metric_ids
                    .get(rating.name())
                    .ok_or_else(|| DbError::UnknownMetric(rating.name().to_string()))?;
                Ok(CreateRating {
                    sdqa_metric_id,
                    sdqa_threshold_id: threshold_ids.get(&sdqa_metric_id).copied(),
                    parent_exposure_id,
                    metric_value: rating.value().as_f64(),
                    metric_err: rating.error().as_f64(),
                    value_is_int: rating.value().is_int(),
                    err_is_int: rating.error().is_int(),
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        let written = Self::insert_rows(pool, level, &rows).await?;
        tracing::debug!(
            scope = %scope,
            parent_exposure_id,
            written,
            "Persisted SDQA rating set"
        );
        Ok(written)
    }

    /// Read back the ratings filed under the exposure for `scope`.
    ///
    /// Values and errors come back in the form they were written in.
    /// Integers are exact up to 2^53.
    pub async fn retrieve_set(
        pool: &PgPool,
        scope: RatingScope,
        ids: &ExposureIds,
    ) -> Result<RatingSet, DbError> {
        let parent_exposure_id = ids.parent_id_for(scope)?;
        let level = ExposureLevel::for_scope(scope)?;

        let rows = Self::list_for_exposure(pool, level, parent_exposure_id).await?;
        if rows.is_empty() {
            return Ok(RatingSet::new());
        }

        let names: HashMap<DbId, String> = MetricRepo::list(pool)
            .await?
            .into_iter()
            .map(|row| (row.id, row.metric_name))
            .collect();

        let mut set = RatingSet::with_capacity(rows.len());
        for row in rows {
            let name = names.get(&row.sdqa_metric_id).ok_or_else(|| {
                DbError::CorruptRow(format!(
                    "rating {} references missing metric {}",
                    row.id, row.sdqa_metric_id
                ))
            })?;
            set.append(Rating::new(
                name.as_str(),
                restore_value(row.metric_value, row.value_is_int),
                restore_value(row.metric_err, row.err_is_int),
                scope,
            )?);
        }
        Ok(set)
    }
}

/// Give a stored double back the form it was written in.
fn restore_value(stored: f64, is_int: bool) -> MetricValue {
    if is_int && stored.is_finite() {
        MetricValue::Int(stored as i64)
    } else {
        MetricValue::Float(stored)
    }
}
