use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no record stored under {0}")]
    NotFound(String),

    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("stored governance state is corrupted: {0}")]
    Corruption(String),
}
