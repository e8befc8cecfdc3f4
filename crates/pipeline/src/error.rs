use sdqa_core::error::CoreError;
use sdqa_core::persistence::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required clipboard entry is absent. Fatal for the stage.
    #[error("Missing {0} on clipboard")]
    MissingInput(String),

    #[error("Clipboard item '{key}' is {found}, expected {expected}")]
    WrongItemType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Property '{0}' not found")]
    MissingProperty(String),

    #[error("Property '{name}' is not {expected}")]
    PropertyType { name: String, expected: &'static str },

    #[error("Too few astrometric matches: {n_matches} < {min_matches}")]
    TooFewMatches { n_matches: i64, min_matches: i64 },

    #[error("RMS radial distance too large: {rms_rad_dist} > {max_rms_rad_dist} arcsec")]
    RmsTooLarge {
        rms_rad_dist: f64,
        max_rms_rad_dist: f64,
    },

    #[error("Invalid stage configuration: {0}")]
    Config(String),

    #[error("Failed to read policy file {path}: {source}")]
    PolicyIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse policy file {path}: {source}")]
    PolicyParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
