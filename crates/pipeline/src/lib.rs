//! Pipeline glue for SDQA.
//!
//! Stages read their inputs from a [`clipboard::Clipboard`] shared with the
//! surrounding pipeline, turn them into ratings and publish the resulting
//! [`sdqa_core::rating::RatingSet`] back on the clipboard for the
//! persistence step ([`persist::persist_from_clipboard`]).

pub mod clipboard;
pub mod config;
pub mod error;
pub mod exposure;
pub mod isr_sdqa;
pub mod persist;
pub mod property_set;
pub mod source;
pub mod stage;
pub mod wcs_failure_check;

pub use error::PipelineError;
