//! SDQA worker: runs the SDQA stages over one input document and files the
//! resulting ratings with a [`RatingStore`].

pub mod config;
pub mod input;

use anyhow::Context;

use sdqa_core::persistence::RatingStore;
use sdqa_pipeline::config::{load_policy, IsrSdqaConfig, WcsFailureCheckConfig};
use sdqa_pipeline::isr_sdqa::IsrSdqaStage;
use sdqa_pipeline::persist::persist_from_clipboard;
use sdqa_pipeline::stage::{run_stages, Stage};
use sdqa_pipeline::wcs_failure_check::{FixedMatcher, WcsFailureCheckStage};
use sdqa_pipeline::PipelineError;

use crate::config::WorkerConfig;
use crate::input::InputDocument;

/// Outcome of one worker run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Rows written per clipboard key, in stage order.
    pub persisted: Vec<(String, u64)>,
    /// The stage failure, if any. Ratings published before the failure are
    /// still persisted.
    pub failure: Option<PipelineError>,
    /// Rating sets the store refused, per clipboard key. Other sets are
    /// still written.
    pub persist_failures: Vec<(String, PipelineError)>,
}

impl RunSummary {
    pub fn total_persisted(&self) -> u64 {
        self.persisted.iter().map(|(_, n)| n).sum()
    }

    /// No stage failed and every published set was written.
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.persist_failures.is_empty()
    }
}

/// Load the input document and stage policies named by `config`, run the
/// stages the document has inputs for and persist their ratings.
///
/// A stage is only configured when the document has inputs for it, so a
/// bad policy for an unused stage does not stop the run. Configuration and
/// I/O problems are returned as errors; stage and store failures are
/// reported in the [`RunSummary`].
pub async fn run(config: &WorkerConfig, store: &dyn RatingStore) -> anyhow::Result<RunSummary> {
    let document = InputDocument::load(&config.input_path)?;
    let ids = document.resolve_exposure_ids()?;
    tracing::info!(
        input = %config.input_path.display(),
        exposure_id = ?ids.exposure_id,
        ccd_exposure_id = ?ids.ccd_exposure_id,
        amp_exposure_id = ?ids.amp_exposure_id,
        "Loaded input document"
    );

    let isr = if document.has_isr_inputs() {
        let policy: IsrSdqaConfig = match &config.isr_policy {
            Some(path) => load_policy(path)?,
            None => IsrSdqaConfig::default(),
        };
        Some(IsrSdqaStage::setup(policy).context("Invalid ISR SDQA policy")?)
    } else {
        None
    };
    let wcs = if document.has_wcs_inputs() {
        let policy: WcsFailureCheckConfig = match &config.wcs_policy {
            Some(path) => load_policy(path)?,
            None => WcsFailureCheckConfig::default(),
        };
        Some(
            WcsFailureCheckStage::setup(policy, FixedMatcher::default())
                .context("Invalid WCS failure-check policy")?,
        )
    } else {
        None
    };

    let mut stages: Vec<&dyn Stage> = Vec::new();
    let mut output_keys = Vec::new();
    if let Some(isr) = &isr {
        stages.push(isr);
        output_keys.push(isr.config().output_keys.ratings_key.clone());
    }
    if let Some(wcs) = &wcs {
        stages.push(wcs);
        output_keys.push(wcs.config().output_keys.ratings_key.clone());
    }
    if stages.is_empty() {
        tracing::warn!("Input document has no exposure, CCD metadata or sources; nothing to assess");
    }

    let isr_config = isr.as_ref().map(|s| s.config().clone()).unwrap_or_default();
    let wcs_config = wcs.as_ref().map(|s| s.config().clone()).unwrap_or_default();
    let mut clipboard = document.into_clipboard(&isr_config, &wcs_config);
    let failure = run_stages(&stages, &mut clipboard).err();

    let mut summary = RunSummary {
        failure,
        ..RunSummary::default()
    };
    for key in output_keys {
        if !clipboard.contains(&key) {
            continue;
        }
        match persist_from_clipboard(store, &mut clipboard, &key, &ids).await {
            Ok(written) => summary.persisted.push((key, written)),
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to persist ratings");
                summary.persist_failures.push((key, e));
            }
        }
    }

    tracing::info!(
        rows = summary.total_persisted(),
        stage_failed = summary.failure.is_some(),
        persist_failures = summary.persist_failures.len(),
        "SDQA run complete"
    );
    Ok(summary)
}
