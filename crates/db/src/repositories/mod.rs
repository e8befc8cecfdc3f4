//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod image_status_repo;
pub mod metric_repo;
pub mod rating_repo;
pub mod threshold_repo;

pub use image_status_repo::ImageStatusRepo;
pub use metric_repo::MetricRepo;
pub use rating_repo::RatingRepo;
pub use threshold_repo::ThresholdRepo;
