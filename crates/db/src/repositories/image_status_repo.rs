//! Repository for the `sdqa_image_status` table.

use sdqa_core::types::DbId;
use sqlx::PgPool;

use crate::models::image_status::ImageStatusRow;

pub struct ImageStatusRepo;

impl ImageStatusRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<ImageStatusRow>, sqlx::Error> {
        sqlx::query_as::<_, ImageStatusRow>(
            "SELECT id, status_name, definition FROM sdqa_image_status ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ImageStatusRow>, sqlx::Error> {
        sqlx::query_as::<_, ImageStatusRow>(
            "SELECT id, status_name, definition FROM sdqa_image_status WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_name(
        pool: &PgPool,
        status_name: &str,
    ) -> Result<Option<ImageStatusRow>, sqlx::Error> {
        sqlx::query_as::<_, ImageStatusRow>(
            "SELECT id, status_name, definition FROM sdqa_image_status WHERE status_name = $1",
        )
        .bind(status_name)
        .fetch_optional(pool)
        .await
    }
}
