//! Extracted sources and the selection applied before astrometric matching.

use serde::{Deserialize, Serialize};

/// Detection flag bits.
pub mod flags {
    /// Confused with a neighbouring detection.
    pub const CONFUSED: u32 = 0b0000_0011;
    pub const SATURATED: u32 = 0b0000_0100;
    /// Touches the edge of the image.
    pub const EDGE: u32 = 0b0000_1000;
    pub const CORRUPTED: u32 = 0b0001_0000;
}

/// A source detected on a CCD exposure.
///
/// `ra` and `dec` are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSource {
    pub id: i64,
    pub ra: f64,
    pub dec: f64,
    #[serde(default)]
    pub peak: f64,
    #[serde(default)]
    pub stellarity: f64,
    #[serde(default)]
    pub local_background: f64,
    #[serde(default)]
    pub local_background_sigma: f64,
    #[serde(default)]
    pub flags: u32,
}

impl ExtractedSource {
    pub fn new(id: i64, ra: f64, dec: f64) -> Self {
        Self {
            id,
            ra,
            dec,
            peak: 0.0,
            stellarity: 0.0,
            local_background: 0.0,
            local_background_sigma: 0.0,
            flags: 0,
        }
    }

    /// Peak level a source must exceed to count as significant:
    /// `local_background + n_sigma * local_background_sigma`.
    pub fn peak_threshold(&self, n_sigma: f64) -> f64 {
        self.local_background + n_sigma * self.local_background_sigma
    }
}

/// Criteria for sources worth matching against a reference catalogue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceSelection {
    pub min_stellarity: f64,
    pub n_local_bkg_sigma: f64,
}

impl SourceSelection {
    /// Star-like, unflagged and significantly above the local background.
    pub fn accepts(&self, source: &ExtractedSource) -> bool {
        source.stellarity > self.min_stellarity
            && source.flags == 0
            && source.peak > source.peak_threshold(self.n_local_bkg_sigma)
    }

    /// Accepted sources, sorted by right ascension.
    pub fn select(&self, sources: &[ExtractedSource]) -> Vec<ExtractedSource> {
        let mut selected: Vec<ExtractedSource> =
            sources.iter().filter(|s| self.accepts(s)).copied().collect();
        selected.sort_by(|a, b| a.ra.total_cmp(&b.ra));
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECTION: SourceSelection = SourceSelection {
        min_stellarity: 0.9,
        n_local_bkg_sigma: 5.0,
    };

    fn star(id: i64, ra: f64) -> ExtractedSource {
        ExtractedSource {
            peak: 1000.0,
            stellarity: 0.98,
            local_background: 100.0,
            local_background_sigma: 10.0,
            ..ExtractedSource::new(id, ra, -30.0)
        }
    }

    #[test]
    fn peak_threshold_uses_local_background() {
        assert_eq!(star(1, 0.0).peak_threshold(5.0), 150.0);
    }

    #[test]
    fn accepts_bright_unflagged_star() {
        assert!(SELECTION.accepts(&star(1, 10.0)));
    }

    #[test]
    fn rejects_galaxies_flagged_and_faint_sources() {
        let galaxy = ExtractedSource {
            stellarity: 0.2,
            ..star(1, 10.0)
        };
        let saturated = ExtractedSource {
            flags: flags::SATURATED,
            ..star(2, 10.0)
        };
        let faint = ExtractedSource {
            peak: 150.0,
            ..star(3, 10.0)
        };
        assert!(!SELECTION.accepts(&galaxy));
        assert!(!SELECTION.accepts(&saturated));
        assert!(!SELECTION.accepts(&faint));
    }

    #[test]
    fn stellarity_bound_is_exclusive() {
        let edge = ExtractedSource {
            stellarity: 0.9,
            ..star(1, 10.0)
        };
        assert!(!SELECTION.accepts(&edge));
    }

    #[test]
    fn select_sorts_by_right_ascension() {
        let sources = [
            star(1, 30.5),
            ExtractedSource {
                flags: flags::EDGE,
                ..star(2, 1.0)
            },
            star(3, 12.25),
            star(4, 359.9),
        ];
        let ids: Vec<i64> = SELECTION.select(&sources).iter().map(|s| s.id).collect();
        assert_eq!(ids, [3, 1, 4]);
    }
}
