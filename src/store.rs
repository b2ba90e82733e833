/// Failure classes shared by every store trait.
///
/// `Duplicate` surfaces unique-constraint violations so callers can answer
/// with a conflict instead of a bare 500. `Unavailable` covers pool and
/// connection level failures where retrying later could succeed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate value for {0}")]
    Duplicate(String),
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation => {
                StoreError::Duplicate(db.constraint().unwrap_or("unique constraint").to_string())
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(e),
            _ => StoreError::Internal(anyhow::Error::new(e)),
        }
    }
}
