//! Stage configuration ("policy").
//!
//! Each stage resolves its configuration once, at setup. Policy files are
//! JSON documents whose layout mirrors the structs below (camelCase keys,
//! grouped into `inputKeys`, `parameters` and `outputKeys`); any key a file
//! leaves out keeps its default.
//!
//! ```json
//! { "parameters": { "minMatches": 25, "maxRmsRadDist": 0.5 } }
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use sdqa_core::metric_names::DEFAULT_ISR_METRICS;
use sdqa_core::rating::RatingScope;

use crate::error::PipelineError;

/// Read a policy file, merging it over the type's defaults.
pub fn load_policy<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| PipelineError::PolicyIo {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| PipelineError::PolicyParse {
        path: display,
        source,
    })
}

// ---------------------------------------------------------------------------
// ISR SDQA stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IsrSdqaConfig {
    pub input_keys: IsrInputKeys,
    pub parameters: IsrParameters,
    pub output_keys: IsrOutputKeys,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IsrInputKeys {
    pub exposure_key: String,
}

impl Default for IsrInputKeys {
    fn default() -> Self {
        Self {
            exposure_key: "exposure".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IsrParameters {
    pub sdqa_rating_scope: RatingScope,
    /// Metadata cards harvested into ratings, in output order.
    pub sdqa_metric_names: Vec<String>,
}

impl Default for IsrParameters {
    fn default() -> Self {
        Self {
            sdqa_rating_scope: RatingScope::Amp,
            sdqa_metric_names: DEFAULT_ISR_METRICS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IsrOutputKeys {
    #[serde(alias = "isrPersistableSdqaRatingVectorKey")]
    pub ratings_key: String,
}

impl Default for IsrOutputKeys {
    fn default() -> Self {
        Self {
            ratings_key: "isrPersistableSdqaRatingVector".to_string(),
        }
    }
}

impl IsrSdqaConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        require_key("inputKeys.exposureKey", &self.input_keys.exposure_key)?;
        require_key("outputKeys.ratingsKey", &self.output_keys.ratings_key)?;
        if !self.parameters.sdqa_rating_scope.is_valid() {
            return Err(PipelineError::Config(
                "parameters.sdqaRatingScope must be one of AMP, CCD, FPA, FOOTPRINT".to_string(),
            ));
        }
        if let Some(blank) = self
            .parameters
            .sdqa_metric_names
            .iter()
            .position(|n| n.trim().is_empty())
        {
            return Err(PipelineError::Config(format!(
                "parameters.sdqaMetricNames[{blank}] is blank"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// WCS failure-check stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WcsFailureCheckConfig {
    pub parameters: WcsParameters,
    pub input_keys: WcsInputKeys,
    pub output_keys: WcsOutputKeys,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WcsParameters {
    /// Fewest source/catalogue matches accepted.
    pub min_matches: i64,
    /// Largest RMS radial distance of matches accepted, in arcsec.
    pub max_rms_rad_dist: f64,
    /// Match radius, in arcsec.
    pub match_radius: f64,
    /// Sources at or below this stellarity are not matched.
    pub min_stellarity: f64,
    pub n_local_bkg_sigma: f64,
}

impl Default for WcsParameters {
    fn default() -> Self {
        Self {
            min_matches: 10,
            max_rms_rad_dist: 1.0,
            match_radius: 2.0,
            min_stellarity: 0.9,
            n_local_bkg_sigma: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WcsInputKeys {
    pub ccd_metadata_key: String,
    pub extracted_source_set_key: String,
}

impl Default for WcsInputKeys {
    fn default() -> Self {
        Self {
            ccd_metadata_key: "ccdMetadata".to_string(),
            extracted_source_set_key: "extractedSourceSet".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WcsOutputKeys {
    #[serde(alias = "astromVerifSdqaRatingsKey")]
    pub ratings_key: String,
}

impl Default for WcsOutputKeys {
    fn default() -> Self {
        Self {
            ratings_key: "astromVerifSdqaRatings".to_string(),
        }
    }
}

impl WcsFailureCheckConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let p = &self.parameters;
        if p.min_matches < 0 {
            return Err(PipelineError::Config(format!(
                "parameters.minMatches must be >= 0, got {}",
                p.min_matches
            )));
        }
        require_non_negative("parameters.maxRmsRadDist", p.max_rms_rad_dist)?;
        require_non_negative("parameters.matchRadius", p.match_radius)?;
        require_non_negative("parameters.nLocalBkgSigma", p.n_local_bkg_sigma)?;
        if !(0.0..=1.0).contains(&p.min_stellarity) {
            return Err(PipelineError::Config(format!(
                "parameters.minStellarity must be in [0, 1], got {}",
                p.min_stellarity
            )));
        }
        require_key("inputKeys.ccdMetadataKey", &self.input_keys.ccd_metadata_key)?;
        require_key(
            "inputKeys.extractedSourceSetKey",
            &self.input_keys.extracted_source_set_key,
        )?;
        require_key("outputKeys.ratingsKey", &self.output_keys.ratings_key)?;
        Ok(())
    }
}

fn require_key(field: &str, value: &str) -> Result<(), PipelineError> {
    if value.trim().is_empty() {
        return Err(PipelineError::Config(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> Result<(), PipelineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PipelineError::Config(format!(
            "{field} must be a finite value >= 0, got {value}"
        )));
    }
    Ok(())
}
