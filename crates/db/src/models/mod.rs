//! Row structs and DTOs for the SDQA tables.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row, a create DTO for inserts, and a conversion into the `sdqa_core`
//! value type.

pub mod image_status;
pub mod metric;
pub mod rating;
pub mod threshold;
