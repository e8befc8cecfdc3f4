//! Harvests instrument-signature-removal statistics into SDQA ratings.
//!
//! The ISR stages record their statistics as exposure metadata cards. This
//! stage reads the configured cards and republishes them as a
//! [`RatingSet`] for persistence.

use sdqa_core::rating::{Rating, RatingSet};

use crate::clipboard::Clipboard;
use crate::config::IsrSdqaConfig;
use crate::error::PipelineError;
use crate::property_set::PropertySet;
use crate::stage::Stage;

#[derive(Debug)]
pub struct IsrSdqaStage {
    config: IsrSdqaConfig,
}

impl IsrSdqaStage {
    pub fn setup(config: IsrSdqaConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        tracing::info!(
            exposure_key = %config.input_keys.exposure_key,
            scope = %config.parameters.sdqa_rating_scope,
            metrics = ?config.parameters.sdqa_metric_names,
            ratings_key = %config.output_keys.ratings_key,
            "IsrSdqaStage configured"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &IsrSdqaConfig {
        &self.config
    }

    fn build_ratings(&self, metadata: &PropertySet) -> Result<RatingSet, PipelineError> {
        let params = &self.config.parameters;
        let mut ratings = RatingSet::with_capacity(params.sdqa_metric_names.len());
        for name in &params.sdqa_metric_names {
            let value = read_metric(metadata, name)?;
            tracing::debug!(metric = %name, value, "Read ISR metric");
            ratings.append(Rating::new(
                name.as_str(),
                value,
                0.0,
                params.sdqa_rating_scope,
            )?);
        }
        Ok(ratings)
    }
}

impl Stage for IsrSdqaStage {
    fn name(&self) -> &'static str {
        "IsrSdqaStage"
    }

    fn process(&self, clipboard: &mut Clipboard) -> Result<(), PipelineError> {
        let exposure_key = &self.config.input_keys.exposure_key;
        let ratings = self.build_ratings(clipboard.exposure(exposure_key)?.metadata())?;

        tracing::debug!(
            count = ratings.len(),
            key = %self.config.output_keys.ratings_key,
            "Publishing ISR ratings"
        );
        clipboard.put(self.config.output_keys.ratings_key.as_str(), ratings);
        Ok(())
    }
}

/// Metadata written through FITS headers comes back upper-cased, so a
/// missing card is retried under its upper-case name.
fn read_metric(metadata: &PropertySet, name: &str) -> Result<f64, PipelineError> {
    match metadata.get_as_double(name) {
        Err(PipelineError::MissingProperty(_)) => metadata.get_as_double(&name.to_uppercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use sdqa_core::rating::{MetricValue, RatingScope};

    use super::*;
    use crate::exposure::Exposure;

    fn config(names: &[&str]) -> IsrSdqaConfig {
        let mut config = IsrSdqaConfig::default();
        config.parameters.sdqa_metric_names = names.iter().map(|s| s.to_string()).collect();
        config
    }

    fn clipboard_with(metadata: PropertySet) -> Clipboard {
        let mut clipboard = Clipboard::new();
        clipboard.put("exposure", Exposure::new(metadata));
        clipboard
    }

    #[test]
    fn publishes_one_rating_per_metric_in_order() {
        let stage = IsrSdqaStage::setup(config(&["overscanMean", "nSaturatePix"])).unwrap();
        let mut clipboard = clipboard_with(
            PropertySet::new()
                .with("nSaturatePix", 12)
                .with("overscanMean", 1021.5),
        );

        stage.process(&mut clipboard).unwrap();

        let ratings = clipboard.ratings("isrPersistableSdqaRatingVector").unwrap();
        assert_eq!(ratings.len(), 2);
        let first = ratings.get(0).unwrap();
        assert_eq!(first.name(), "overscanMean");
        assert_eq!(first.value(), MetricValue::Float(1021.5));
        assert_eq!(first.error(), MetricValue::Float(0.0));
        assert_eq!(first.scope(), RatingScope::Amp);
        assert_eq!(ratings.get(1).unwrap().value().as_f64(), 12.0);
    }

    #[test]
    fn falls_back_to_upper_case_card() {
        let stage = IsrSdqaStage::setup(config(&["overscanStdDev"])).unwrap();
        let mut clipboard = clipboard_with(PropertySet::new().with("OVERSCANSTDDEV", 3.5));

        stage.process(&mut clipboard).unwrap();

        let ratings = clipboard.ratings("isrPersistableSdqaRatingVector").unwrap();
        assert_eq!(ratings.get(0).unwrap().name(), "overscanStdDev");
        assert_eq!(ratings.get(0).unwrap().value().as_f64(), 3.5);
    }

    #[test]
    fn missing_card_fails_without_publishing() {
        let stage = IsrSdqaStage::setup(config(&["overscanMean", "overscanMax"])).unwrap();
        let mut clipboard = clipboard_with(PropertySet::new().with("overscanMean", 1.0));

        assert_matches!(
            stage.process(&mut clipboard),
            Err(PipelineError::MissingProperty(name)) if name == "OVERSCANMAX"
        );
        assert!(!clipboard.contains("isrPersistableSdqaRatingVector"));
    }

    #[test]
    fn non_numeric_card_is_a_type_error() {
        let stage = IsrSdqaStage::setup(config(&["overscanMean"])).unwrap();
        let mut clipboard = clipboard_with(PropertySet::new().with("overscanMean", "high"));
        assert_matches!(
            stage.process(&mut clipboard),
            Err(PipelineError::PropertyType { .. })
        );
    }

    #[test]
    fn missing_exposure_is_missing_input() {
        let stage = IsrSdqaStage::setup(IsrSdqaConfig::default()).unwrap();
        assert_matches!(
            stage.process(&mut Clipboard::new()),
            Err(PipelineError::MissingInput(_))
        );
    }

    #[test]
    fn uses_configured_scope_and_keys() {
        let mut cfg = config(&["overscanMin"]);
        cfg.input_keys.exposure_key = "postIsr".to_string();
        cfg.output_keys.ratings_key = "ccdIsrRatings".to_string();
        cfg.parameters.sdqa_rating_scope = RatingScope::Ccd;
        let stage = IsrSdqaStage::setup(cfg).unwrap();

        let mut clipboard = Clipboard::new();
        clipboard.put(
            "postIsr",
            Exposure::new(PropertySet::new().with("overscanMin", 990.0)),
        );
        stage.process(&mut clipboard).unwrap();

        let ratings = clipboard.ratings("ccdIsrRatings").unwrap();
        assert_eq!(ratings.scope().unwrap(), RatingScope::Ccd);
    }

    #[test]
    fn empty_metric_list_publishes_empty_set() {
        let stage = IsrSdqaStage::setup(config(&[])).unwrap();
        let mut clipboard = clipboard_with(PropertySet::new());
        stage.process(&mut clipboard).unwrap();
        assert!(clipboard.ratings("isrPersistableSdqaRatingVector").unwrap().is_empty());
    }

    #[test]
    fn setup_rejects_invalid_config() {
        let mut cfg = IsrSdqaConfig::default();
        cfg.parameters.sdqa_rating_scope = RatingScope::Invalid;
        assert_matches!(IsrSdqaStage::setup(cfg), Err(PipelineError::Config(_)));
    }
}
