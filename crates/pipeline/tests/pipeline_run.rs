//! End-to-end run of both SDQA stages against an in-memory store.

use assert_matches::assert_matches;
use sdqa_core::metric_names::{self, DEFAULT_ISR_METRICS};
use sdqa_core::persistence::{MemoryRatingStore, RatingStore};
use sdqa_core::rating::{MetricValue, RatingScope};
use sdqa_pipeline::clipboard::Clipboard;
use sdqa_pipeline::config::{IsrSdqaConfig, WcsFailureCheckConfig};
use sdqa_pipeline::exposure::Exposure;
use sdqa_pipeline::isr_sdqa::IsrSdqaStage;
use sdqa_pipeline::persist::persist_from_clipboard;
use sdqa_pipeline::property_set::PropertySet;
use sdqa_pipeline::source::ExtractedSource;
use sdqa_pipeline::stage::{run_stages, Stage};
use sdqa_pipeline::wcs_failure_check::{FixedMatcher, WcsFailureCheckStage};
use sdqa_pipeline::PipelineError;

const AMP_EXPOSURE_ID: i64 = 880_001_201;
const CCD_EXPOSURE_ID: i64 = 88_000_012;

fn isr_metadata() -> PropertySet {
    // Cards come back from FITS upper-cased, except the ones added later.
    PropertySet::new()
        .with("OVERSCANMEAN", 1021.5)
        .with("OVERSCANMEDIAN", 1021.0)
        .with("OVERSCANSTDDEV", 3.25)
        .with("OVERSCANMIN", 1003.0)
        .with("OVERSCANMAX", 1040.0)
        .with("nBadCalibPix", 17)
        .with("nSaturatePix", 230)
        .with("ampExposureId", AMP_EXPOSURE_ID)
}

fn loaded_clipboard() -> Clipboard {
    let mut clipboard = Clipboard::new();
    clipboard.put("exposure", Exposure::new(isr_metadata()));
    clipboard.put(
        "ccdMetadata",
        PropertySet::new().with("ccdExposureId", CCD_EXPOSURE_ID),
    );
    clipboard.put(
        "extractedSourceSet",
        (0..40)
            .map(|i| ExtractedSource {
                peak: 4000.0,
                stellarity: 0.97,
                local_background: 120.0,
                local_background_sigma: 11.0,
                ..ExtractedSource::new(i, 150.0 + i as f64 * 0.001, 2.2)
            })
            .collect::<Vec<_>>(),
    );
    clipboard
}

#[tokio::test]
async fn both_stages_publish_and_persist() {
    let isr = IsrSdqaStage::setup(IsrSdqaConfig::default()).unwrap();
    let wcs =
        WcsFailureCheckStage::setup(WcsFailureCheckConfig::default(), FixedMatcher::default())
            .unwrap();
    let mut clipboard = loaded_clipboard();

    run_stages(&[&isr, &wcs], &mut clipboard).unwrap();

    let amp_ids = clipboard.exposure("exposure").unwrap().metadata().exposure_ids().unwrap();
    let ccd_ids = clipboard.property_set("ccdMetadata").unwrap().exposure_ids().unwrap();
    let store = MemoryRatingStore::with_known_metrics(
        DEFAULT_ISR_METRICS
            .iter()
            .copied()
            .chain([metric_names::N_ASTROM_VERIF_MATCHES, metric_names::ASTROM_VERIF_RMS_RAD_DIST]),
    );

    let isr_key = &isr.config().output_keys.ratings_key;
    let wcs_key = &wcs.config().output_keys.ratings_key;
    assert_eq!(
        persist_from_clipboard(&store, &mut clipboard, isr_key, &amp_ids).await.unwrap(),
        7
    );
    assert_eq!(
        persist_from_clipboard(&store, &mut clipboard, wcs_key, &ccd_ids).await.unwrap(),
        2
    );
    assert_eq!(store.len(), 9);

    let amp = store.retrieve(RatingScope::Amp, &amp_ids).await.unwrap();
    let names: Vec<&str> = amp.iter().map(|r| r.name()).collect();
    assert_eq!(names, DEFAULT_ISR_METRICS);
    assert_eq!(amp.get(2).unwrap().value(), MetricValue::Float(3.25));
    assert_eq!(amp.get(6).unwrap().value().as_f64(), 230.0);

    let ccd = store.retrieve(RatingScope::Ccd, &ccd_ids).await.unwrap();
    assert_eq!(ccd.get(0).unwrap().value(), MetricValue::Int(456_789));
}

#[test]
fn failing_wcs_check_leaves_ratings_for_persistence() {
    let isr = IsrSdqaStage::setup(IsrSdqaConfig::default()).unwrap();
    let wcs = WcsFailureCheckStage::setup(WcsFailureCheckConfig::default(), FixedMatcher::new(4, 0.2))
        .unwrap();
    let stages: [&dyn Stage; 2] = [&isr, &wcs];
    let mut clipboard = loaded_clipboard();

    let result = run_stages(&stages, &mut clipboard);

    assert_matches!(result, Err(PipelineError::TooFewMatches { n_matches: 4, .. }));
    assert_eq!(clipboard.ratings("isrPersistableSdqaRatingVector").unwrap().len(), 7);
    assert_eq!(clipboard.ratings("astromVerifSdqaRatings").unwrap().len(), 2);
}

#[test]
fn isr_failure_stops_before_wcs_check() {
    let isr = IsrSdqaStage::setup(IsrSdqaConfig::default()).unwrap();
    let wcs =
        WcsFailureCheckStage::setup(WcsFailureCheckConfig::default(), FixedMatcher::default())
            .unwrap();
    let mut clipboard = loaded_clipboard();
    clipboard.put("exposure", Exposure::new(PropertySet::new()));

    let result = run_stages(&[&isr, &wcs], &mut clipboard);

    assert_matches!(result, Err(PipelineError::MissingProperty(_)));
    assert!(!clipboard.contains("astromVerifSdqaRatings"));
}
