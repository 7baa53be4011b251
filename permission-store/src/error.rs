use permissions::PermissionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Permission rule not found: {0}")]
    RuleNotFound(String),

    #[error("Invalid rule record: {0}")]
    InvalidRecord(String),

    #[error("Initialization error: {0}")]
    Initialization(String),
}

impl From<StoreError> for PermissionError {
    fn from(err: StoreError) -> Self {
        PermissionError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
