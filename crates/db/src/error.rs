use sdqa_core::error::CoreError;
use sdqa_core::persistence::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A rating names a metric absent from `sdqa_metric`.
    #[error("Unknown SDQA metric: '{0}'")]
    UnknownMetric(String),

    /// A stored row references data that no longer resolves.
    #[error("Corrupt SDQA row: {0}")]
    CorruptRow(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(core) => StoreError::Core(core),
            DbError::UnknownMetric(name) => StoreError::UnknownMetric(name),
            other => StoreError::Backend(Box::new(other)),
        }
    }
}
