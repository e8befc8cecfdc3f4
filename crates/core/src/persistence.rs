//! Persistence seam for rating sets.
//!
//! Stages never talk to a database directly. They publish a [`RatingSet`]
//! and a [`RatingStore`] implementation (PostgreSQL in `sdqa-db`, or the
//! in-memory [`MemoryRatingStore`]) files it against the exposure it was
//! measured on.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::rating::{Rating, RatingScope, RatingSet};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Exposure levels
// ---------------------------------------------------------------------------

/// The exposure level whose rating table a scope is written to.
///
/// Footprint ratings are filed with amplifier exposures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExposureLevel {
    Amp,
    Ccd,
    Fpa,
}

impl ExposureLevel {
    pub fn for_scope(scope: RatingScope) -> Result<Self, CoreError> {
        match scope {
            RatingScope::Amp | RatingScope::Footprint => Ok(Self::Amp),
            RatingScope::Ccd => Ok(Self::Ccd),
            RatingScope::Fpa => Ok(Self::Fpa),
            RatingScope::Invalid => Err(CoreError::InvalidArgument(
                "INVALID scope has no exposure level".to_string(),
            )),
        }
    }

    /// Name of the property carrying this level's exposure id.
    pub fn id_property(self) -> &'static str {
        match self {
            Self::Amp => "ampExposureId",
            Self::Ccd => "ccdExposureId",
            Self::Fpa => "exposureId",
        }
    }
}

/// Identifiers of the exposure a rating set was measured on.
///
/// Only the id matching the set's scope has to be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposureIds {
    pub exposure_id: Option<DbId>,
    pub ccd_exposure_id: Option<DbId>,
    pub amp_exposure_id: Option<DbId>,
}

impl ExposureIds {
    /// The parent exposure id ratings of `scope` are filed under.
    ///
    /// Fails if the id is missing or not positive.
    pub fn parent_id_for(&self, scope: RatingScope) -> Result<DbId, CoreError> {
        let level = ExposureLevel::for_scope(scope)?;
        let id = match level {
            ExposureLevel::Amp => self.amp_exposure_id,
            ExposureLevel::Ccd => self.ccd_exposure_id,
            ExposureLevel::Fpa => self.exposure_id,
        };
        match id {
            Some(id) if id > 0 => Ok(id),
            Some(id) => Err(CoreError::InvalidArgument(format!(
                "{} must be > 0, got {id}",
                level.id_property()
            ))),
            None => Err(CoreError::Validation(format!(
                "{} is required for {scope} ratings",
                level.id_property()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A rating names a metric the store does not know.
    #[error("Unknown SDQA metric: '{0}'")]
    UnknownMetric(String),

    /// Failure inside the storage backend.
    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Writes and reads rating sets keyed by exposure.
///
/// A set is written into the table of its (single) scope. Retrieval
/// returns every rating filed under the parent exposure, tagged with the
/// requested scope; row order is not guaranteed.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Persist `ratings`, returning the number of rows written. An empty
    /// set writes nothing.
    async fn persist(&self, ratings: &RatingSet, ids: &ExposureIds) -> Result<u64, StoreError>;

    /// Load the ratings of `scope` filed under the exposure in `ids`.
    async fn retrieve(
        &self,
        scope: RatingScope,
        ids: &ExposureIds,
    ) -> Result<RatingSet, StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local [`RatingStore`], used for dry runs and tests.
///
/// When `known_metrics` is set, ratings naming other metrics are rejected
/// the same way the database store rejects unregistered names.
#[derive(Debug, Default)]
pub struct MemoryRatingStore {
    known_metrics: Option<Vec<String>>,
    rows: Mutex<HashMap<(ExposureLevel, DbId), Vec<Rating>>>,
}

impl MemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept ratings whose name is in `names`.
    pub fn with_known_metrics<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_metrics: Some(names.into_iter().map(Into::into).collect()),
            rows: Mutex::default(),
        }
    }

    /// Total number of ratings held.
    pub fn len(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(ExposureLevel, DbId), Vec<Rating>>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RatingStore for MemoryRatingStore {
    async fn persist(&self, ratings: &RatingSet, ids: &ExposureIds) -> Result<u64, StoreError> {
        if ratings.is_empty() {
            return Ok(0);
        }
        let scope = ratings.scope()?;
        let parent_id = ids.parent_id_for(scope)?;
        let level = ExposureLevel::for_scope(scope)?;

        if let Some(known) = &self.known_metrics {
            if let Some(unknown) = ratings.iter().find(|r| !known.iter().any(|k| k == r.name())) {
                return Err(StoreError::UnknownMetric(unknown.name().to_string()));
            }
        }

        self.lock()
            .entry((level, parent_id))
            .or_default()
            .extend(ratings.iter().cloned());
        Ok(ratings.len() as u64)
    }

    async fn retrieve(
        &self,
        scope: RatingScope,
        ids: &ExposureIds,
    ) -> Result<RatingSet, StoreError> {
        let parent_id = ids.parent_id_for(scope)?;
        let level = ExposureLevel::for_scope(scope)?;
        let rows = self.lock();
        let Some(stored) = rows.get(&(level, parent_id)) else {
            return Ok(RatingSet::new());
        };
        stored
            .iter()
            .map(|r| Rating::new(r.name(), r.value(), r.error(), scope))
            .collect::<Result<RatingSet, CoreError>>()
            .map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn amp_ids(id: DbId) -> ExposureIds {
        ExposureIds {
            amp_exposure_id: Some(id),
            ..ExposureIds::default()
        }
    }

    #[test]
    fn parent_id_follows_scope() {
        let ids = ExposureIds {
            exposure_id: Some(1),
            ccd_exposure_id: Some(2),
            amp_exposure_id: Some(3),
        };
        assert_eq!(ids.parent_id_for(RatingScope::Fpa).unwrap(), 1);
        assert_eq!(ids.parent_id_for(RatingScope::Ccd).unwrap(), 2);
        assert_eq!(ids.parent_id_for(RatingScope::Amp).unwrap(), 3);
        assert_eq!(ids.parent_id_for(RatingScope::Footprint).unwrap(), 3);
    }

    #[test]
    fn parent_id_missing_or_non_positive() {
        assert_matches!(
            ExposureIds::default().parent_id_for(RatingScope::Ccd),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            amp_ids(0).parent_id_for(RatingScope::Amp),
            Err(CoreError::InvalidArgument(_))
        );
        assert_matches!(
            amp_ids(5).parent_id_for(RatingScope::Invalid),
            Err(CoreError::InvalidArgument(_))
        );
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryRatingStore::new();
        let set: RatingSet = (0..4)
            .map(|m| Rating::new(format!("m{m}"), m * 10 + 1234, 0.5, RatingScope::Amp).unwrap())
            .collect();

        let written = store.persist(&set, &amp_ids(1234)).await.unwrap();
        assert_eq!(written, 4);
        assert_eq!(store.len(), 4);

        let back = store.retrieve(RatingScope::Amp, &amp_ids(1234)).await.unwrap();
        assert_eq!(back, set);
    }

    #[tokio::test]
    async fn footprint_ratings_share_the_amp_table() {
        let store = MemoryRatingStore::new();
        let set: RatingSet = [Rating::new("fp", 1.0, 0.0, RatingScope::Footprint).unwrap()]
            .into_iter()
            .collect();
        store.persist(&set, &amp_ids(9)).await.unwrap();

        let back = store.retrieve(RatingScope::Amp, &amp_ids(9)).await.unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.get(0).unwrap().scope(), RatingScope::Amp);
    }

    #[tokio::test]
    async fn memory_store_rejects_unknown_metric() {
        let store = MemoryRatingStore::with_known_metrics(["known"]);
        let set: RatingSet = [Rating::new("unknown", 1, 0, RatingScope::Amp).unwrap()]
            .into_iter()
            .collect();
        let result = store.persist(&set, &amp_ids(1)).await;
        assert_matches!(result, Err(StoreError::UnknownMetric(name)) if name == "unknown");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn retrieve_of_unknown_exposure_is_empty() {
        let store = MemoryRatingStore::new();
        let ids = ExposureIds {
            ccd_exposure_id: Some(77),
            ..ExposureIds::default()
        };
        let back = store.retrieve(RatingScope::Ccd, &ids).await.unwrap();
        assert!(back.is_empty());
    }
}
