//! Maps to the `sdqa_threshold` table.

use sdqa_core::threshold::Threshold;
use sdqa_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sdqa_threshold` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ThresholdRow {
    pub id: DbId,
    pub sdqa_metric_id: DbId,
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub created_date: Timestamp,
}

impl From<ThresholdRow> for Threshold {
    fn from(row: ThresholdRow) -> Self {
        Threshold::new(
            row.id,
            row.sdqa_metric_id,
            row.upper_threshold,
            row.lower_threshold,
            row.created_date,
        )
    }
}

/// DTO for adding a threshold. `created_date` defaults to now.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateThreshold {
    pub sdqa_metric_id: DbId,
    pub upper_threshold: f64,
    pub lower_threshold: f64,
}
