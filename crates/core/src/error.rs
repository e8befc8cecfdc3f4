#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An argument outside the allowed set, e.g. an `INVALID` scope or data type.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
