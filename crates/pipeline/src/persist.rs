use sdqa_core::persistence::{ExposureIds, RatingStore};

use crate::clipboard::Clipboard;
use crate::error::PipelineError;

/// Persist the rating set published under `key`, returning the number of
/// rows written.
///
/// The set is removed from the clipboard only once the store accepted it.
pub async fn persist_from_clipboard(
    store: &dyn RatingStore,
    clipboard: &mut Clipboard,
    key: &str,
    ids: &ExposureIds,
) -> Result<u64, PipelineError> {
    let written = store.persist(clipboard.ratings(key)?, ids).await?;
    clipboard.take_ratings(key)?;
    tracing::info!(key, written, "Persisted SDQA ratings");
    Ok(written)
}
