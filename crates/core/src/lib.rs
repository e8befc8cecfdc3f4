//! Data model for Science Data Quality Assessment (SDQA).
//!
//! Ratings are named scalar measurements with an uncertainty and a scope,
//! collected by pipeline stages into a [`rating::RatingSet`] and handed to a
//! [`persistence::RatingStore`]. Metric definitions, thresholds and image
//! statuses are reference data read from the SDQA tables.

pub mod error;
pub mod image_status;
pub mod metric;
pub mod metric_names;
pub mod persistence;
pub mod rating;
pub mod threshold;
pub mod types;
