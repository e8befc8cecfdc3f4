//! Well-known SDQA metric names.
//!
//! These must match the `metric_name` values seeded into the `sdqa_metric`
//! table; a rating whose name is not registered there cannot be persisted.

/// Number of matches between extracted and astrometric-reference sources.
pub const N_ASTROM_VERIF_MATCHES: &str = "nAstromVerifMatches";

/// RMS radial distance of those matches, in arcseconds.
pub const ASTROM_VERIF_RMS_RAD_DIST: &str = "astromVerifRmsRadDist";

/// Mean of the overscan region.
pub const OVERSCAN_MEAN: &str = "overscanMean";
/// Median of the overscan region.
pub const OVERSCAN_MEDIAN: &str = "overscanMedian";
/// Standard deviation of the overscan region.
pub const OVERSCAN_STD_DEV: &str = "overscanStdDev";
/// Minimum of the overscan region.
pub const OVERSCAN_MIN: &str = "overscanMin";
/// Maximum of the overscan region.
pub const OVERSCAN_MAX: &str = "overscanMax";
/// Count of pixels flagged bad by calibration.
pub const N_BAD_CALIB_PIX: &str = "nBadCalibPix";
/// Count of saturated pixels.
pub const N_SATURATE_PIX: &str = "nSaturatePix";

/// Metrics the ISR stage harvests from exposure metadata when no policy
/// overrides the list.
pub const DEFAULT_ISR_METRICS: &[&str] = &[
    OVERSCAN_MEAN,
    OVERSCAN_MEDIAN,
    OVERSCAN_STD_DEV,
    OVERSCAN_MIN,
    OVERSCAN_MAX,
    N_BAD_CALIB_PIX,
    N_SATURATE_PIX,
];
