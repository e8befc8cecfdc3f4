//! Maps to the `sdqa_image_status` table.

use sdqa_core::image_status::ImageStatus;
use sdqa_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImageStatusRow {
    pub id: DbId,
    pub status_name: String,
    pub definition: String,
}

impl From<ImageStatusRow> for ImageStatus {
    fn from(row: ImageStatusRow) -> Self {
        ImageStatus::new(row.id, row.status_name, row.definition)
    }
}
