use thiserror::Error;

pub type Result<T> = std::result::Result<T, PermissionError>;

/// Errors shared across the permission system boundary.
///
/// Storage backends wrap their own failures into `Storage` so the
/// authorization engine never depends on a concrete database error type.
#[derive(Error, Debug)]
pub enum PermissionError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Unknown permission action: {0}")]
    InvalidAction(String),

    #[error("Unknown role: {0}")]
    InvalidRole(String),
}
