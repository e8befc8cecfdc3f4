//! Maps to the three `sdqa_rating_for_science_*_exposure` tables.
//!
//! The tables differ only in the name of the parent exposure column, which
//! queries alias to `parent_exposure_id`.

use sdqa_core::persistence::ExposureLevel;
use sdqa_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from one of the rating tables.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RatingRow {
    pub id: DbId,
    pub sdqa_metric_id: DbId,
    pub sdqa_threshold_id: Option<DbId>,
    pub parent_exposure_id: DbId,
    pub metric_value: f64,
    pub metric_err: f64,
    pub value_is_int: bool,
    pub err_is_int: bool,
    pub created_at: Timestamp,
}

/// A rating resolved against the reference tables, ready to insert.
#[derive(Debug, Clone)]
pub struct CreateRating {
    pub sdqa_metric_id: DbId,
    pub sdqa_threshold_id: Option<DbId>,
    pub parent_exposure_id: DbId,
    pub metric_value: f64,
    pub metric_err: f64,
    pub value_is_int: bool,
    pub err_is_int: bool,
}

/// Table and parent-id column ratings of `level` are stored in.
pub fn rating_table(level: ExposureLevel) -> (&'static str, &'static str) {
    match level {
        ExposureLevel::Amp => ("sdqa_rating_for_science_amp_exposure", "amp_exposure_id"),
        ExposureLevel::Ccd => ("sdqa_rating_for_science_ccd_exposure", "ccd_exposure_id"),
        ExposureLevel::Fpa => ("sdqa_rating_for_science_fpa_exposure", "exposure_id"),
    }
}
