pub mod repository;

pub use repository::BookingStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Conflicting record: {0}")]
    Conflict(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn database<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Database(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
