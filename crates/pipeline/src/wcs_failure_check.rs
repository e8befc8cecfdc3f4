//! Astrometric verification of a CCD's WCS solution.
//!
//! Bright, star-like sources extracted from the CCD are matched against a
//! reference catalogue. The number of matches and their RMS radial
//! distance are published as CCD ratings; too few matches or too large a
//! distance fails the stage.

use sdqa_core::metric_names::{ASTROM_VERIF_RMS_RAD_DIST, N_ASTROM_VERIF_MATCHES};
use sdqa_core::rating::{Rating, RatingScope, RatingSet};

use crate::clipboard::Clipboard;
use crate::config::WcsFailureCheckConfig;
use crate::error::PipelineError;
use crate::source::{ExtractedSource, SourceSelection};
use crate::stage::Stage;

// ---------------------------------------------------------------------------
// Matcher seam
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub n_matches: i64,
    /// RMS radial distance between matched pairs, in arcsec.
    pub rms_rad_dist: f64,
}

/// Matches selected sources against a reference catalogue.
pub trait AstrometricMatcher: Send + Sync {
    /// `sources` are the selected sources of `ccd_exposure_id`, sorted by
    /// right ascension. `match_radius` is in arcsec.
    fn match_sources(
        &self,
        ccd_exposure_id: i64,
        sources: &[ExtractedSource],
        match_radius: f64,
    ) -> Result<MatchResult, PipelineError>;
}

/// Returns the same result for every CCD.
#[derive(Debug, Clone, Copy)]
pub struct FixedMatcher {
    result: MatchResult,
}

impl FixedMatcher {
    pub fn new(n_matches: i64, rms_rad_dist: f64) -> Self {
        Self {
            result: MatchResult {
                n_matches,
                rms_rad_dist,
            },
        }
    }
}

impl Default for FixedMatcher {
    /// Placeholder figures that pass any sensible policy.
    fn default() -> Self {
        Self::new(456_789, 0.456_789)
    }
}

impl AstrometricMatcher for FixedMatcher {
    fn match_sources(
        &self,
        _ccd_exposure_id: i64,
        _sources: &[ExtractedSource],
        _match_radius: f64,
    ) -> Result<MatchResult, PipelineError> {
        Ok(self.result)
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

pub struct WcsFailureCheckStage {
    config: WcsFailureCheckConfig,
    matcher: Box<dyn AstrometricMatcher>,
}

impl WcsFailureCheckStage {
    pub fn setup(
        config: WcsFailureCheckConfig,
        matcher: impl AstrometricMatcher + 'static,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let p = &config.parameters;
        tracing::info!(
            min_matches = p.min_matches,
            max_rms_rad_dist = p.max_rms_rad_dist,
            match_radius = p.match_radius,
            min_stellarity = p.min_stellarity,
            n_local_bkg_sigma = p.n_local_bkg_sigma,
            ccd_metadata_key = %config.input_keys.ccd_metadata_key,
            extracted_source_set_key = %config.input_keys.extracted_source_set_key,
            ratings_key = %config.output_keys.ratings_key,
            "WcsFailureCheckStage configured"
        );
        Ok(Self {
            config,
            matcher: Box::new(matcher),
        })
    }

    pub fn config(&self) -> &WcsFailureCheckConfig {
        &self.config
    }

    fn selection(&self) -> SourceSelection {
        SourceSelection {
            min_stellarity: self.config.parameters.min_stellarity,
            n_local_bkg_sigma: self.config.parameters.n_local_bkg_sigma,
        }
    }

    fn measure(&self, clipboard: &Clipboard) -> Result<MatchResult, PipelineError> {
        let keys = &self.config.input_keys;
        for key in [&keys.extracted_source_set_key, &keys.ccd_metadata_key] {
            if !clipboard.contains(key) {
                return Err(PipelineError::MissingInput(format!("'{key}'")));
            }
        }

        let ccd_exposure_id = clipboard
            .property_set(&keys.ccd_metadata_key)?
            .get_as_int64("ccdExposureId")?;
        let sources = clipboard.sources(&keys.extracted_source_set_key)?;
        let selected = self.selection().select(sources);
        tracing::debug!(
            ccd_exposure_id,
            extracted = sources.len(),
            selected = selected.len(),
            "Selected sources for astrometric verification"
        );

        let result = self.matcher.match_sources(
            ccd_exposure_id,
            &selected,
            self.config.parameters.match_radius,
        )?;
        tracing::debug!(
            ccd_exposure_id,
            n_matches = result.n_matches,
            rms_rad_dist = result.rms_rad_dist,
            "Astrometric verification measured"
        );
        Ok(result)
    }
}

impl Stage for WcsFailureCheckStage {
    fn name(&self) -> &'static str {
        "WcsFailureCheckStage"
    }

    /// The ratings are published before the thresholds are checked, so a
    /// failing CCD still has its figures recorded.
    fn process(&self, clipboard: &mut Clipboard) -> Result<(), PipelineError> {
        let result = self.measure(clipboard)?;

        let ratings: RatingSet = [
            Rating::new(N_ASTROM_VERIF_MATCHES, result.n_matches, 0, RatingScope::Ccd)?,
            Rating::new(
                ASTROM_VERIF_RMS_RAD_DIST,
                result.rms_rad_dist,
                0.0,
                RatingScope::Ccd,
            )?,
        ]
        .into_iter()
        .collect();
        clipboard.put(self.config.output_keys.ratings_key.as_str(), ratings);

        let p = &self.config.parameters;
        if result.n_matches < p.min_matches {
            return Err(PipelineError::TooFewMatches {
                n_matches: result.n_matches,
                min_matches: p.min_matches,
            });
        }
        if result.rms_rad_dist > p.max_rms_rad_dist {
            return Err(PipelineError::RmsTooLarge {
                rms_rad_dist: result.rms_rad_dist,
                max_rms_rad_dist: p.max_rms_rad_dist,
            });
        }
        Ok(())
    }
}
