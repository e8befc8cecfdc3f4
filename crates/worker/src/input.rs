//! The JSON document a worker run assesses.
//!
//! ```json
//! {
//!   "exposure": { "metadata": { "ampExposureId": 880001201, "OVERSCANMEAN": 1021.5 } },
//!   "ccd_metadata": { "ccdExposureId": 88000012 },
//!   "extracted_sources": [ { "id": 1, "ra": 150.01, "dec": 2.2, "peak": 4000.0 } ],
//!   "exposure_ids": { "exposure_id": 880001 }
//! }
//! ```
//!
//! Every section is optional. Ids in `exposure_ids` take precedence over
//! ids found in metadata.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use sdqa_core::persistence::ExposureIds;
use sdqa_pipeline::clipboard::Clipboard;
use sdqa_pipeline::config::{IsrSdqaConfig, WcsFailureCheckConfig};
use sdqa_pipeline::exposure::Exposure;
use sdqa_pipeline::property_set::PropertySet;
use sdqa_pipeline::source::ExtractedSource;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputDocument {
    #[serde(default)]
    pub exposure: Option<Exposure>,
    #[serde(default)]
    pub ccd_metadata: Option<PropertySet>,
    #[serde(default)]
    pub extracted_sources: Option<Vec<ExtractedSource>>,
    #[serde(default)]
    pub exposure_ids: Option<ExposureIds>,
}

impl InputDocument {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input document {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse input document {}", path.display()))
    }

    /// Whether the ISR SDQA stage has anything to work on.
    pub fn has_isr_inputs(&self) -> bool {
        self.exposure.is_some()
    }

    /// Whether the WCS failure-check stage has anything to work on.
    pub fn has_wcs_inputs(&self) -> bool {
        self.ccd_metadata.is_some() || self.extracted_sources.is_some()
    }

    /// Exposure ids for persistence: explicit ids first, then ids found
    /// in the exposure metadata and the CCD metadata.
    pub fn resolve_exposure_ids(&self) -> anyhow::Result<ExposureIds> {
        let mut ids = self.exposure_ids.unwrap_or_default();
        let metadata = self
            .exposure
            .as_ref()
            .map(Exposure::metadata)
            .into_iter()
            .chain(self.ccd_metadata.as_ref());
        for props in metadata {
            let found = props.exposure_ids()?;
            ids.exposure_id = ids.exposure_id.or(found.exposure_id);
            ids.ccd_exposure_id = ids.ccd_exposure_id.or(found.ccd_exposure_id);
            ids.amp_exposure_id = ids.amp_exposure_id.or(found.amp_exposure_id);
        }
        Ok(ids)
    }

    /// Put each present section on a fresh clipboard under the keys the
    /// stages are configured to read.
    pub fn into_clipboard(self, isr: &IsrSdqaConfig, wcs: &WcsFailureCheckConfig) -> Clipboard {
        let mut clipboard = Clipboard::new();
        if let Some(exposure) = self.exposure {
            clipboard.put(isr.input_keys.exposure_key.as_str(), exposure);
        }
        if let Some(metadata) = self.ccd_metadata {
            clipboard.put(wcs.input_keys.ccd_metadata_key.as_str(), metadata);
        }
        if let Some(sources) = self.extracted_sources {
            clipboard.put(wcs.input_keys.extracted_source_set_key.as_str(), sources);
        }
        clipboard
    }
}
