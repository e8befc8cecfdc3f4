//! PostgreSQL-backed [`RatingStore`].

use async_trait::async_trait;
use sdqa_core::persistence::{ExposureIds, RatingStore, StoreError};
use sdqa_core::rating::{RatingScope, RatingSet};

use crate::repositories::RatingRepo;
use crate::DbPool;

/// Files rating sets into the `sdqa_rating_for_science_*` tables.
#[derive(Debug, Clone)]
pub struct PgRatingStore {
    pool: DbPool,
}

impl PgRatingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl RatingStore for PgRatingStore {
    async fn persist(&self, ratings: &RatingSet, ids: &ExposureIds) -> Result<u64, StoreError> {
        Ok(RatingRepo::persist_set(&self.pool, ratings, ids).await?)
    }

    async fn retrieve(
        &self,
        scope: RatingScope,
        ids: &ExposureIds,
    ) -> Result<RatingSet, StoreError> {
        Ok(RatingRepo::retrieve_set(&self.pool, scope, ids).await?)
    }
}
