//! Maps to the `sdqa_metric` table.

use sdqa_core::error::CoreError;
use sdqa_core::metric::{DataType, Metric};
use sdqa_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sdqa_metric` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MetricRow {
    pub id: DbId,
    pub metric_name: String,
    pub physical_units: String,
    pub data_type: i16,
    pub definition: String,
    pub created_at: Timestamp,
}

impl MetricRow {
    pub fn data_type(&self) -> Result<DataType, CoreError> {
        DataType::from_code(self.data_type)
    }
}

impl TryFrom<MetricRow> for Metric {
    type Error = CoreError;

    fn try_from(row: MetricRow) -> Result<Self, Self::Error> {
        let data_type = row.data_type()?;
        Metric::new(row.id, row.metric_name, row.physical_units, data_type, row.definition)
    }
}

/// DTO for registering a metric.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMetric {
    pub metric_name: String,
    pub physical_units: String,
    pub data_type: DataType,
    pub definition: String,
}
