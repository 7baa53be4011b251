//! Error types for the authorization engine.
//!
//! The three variants are deliberately distinct so callers and monitoring
//! can tell "no identity", "you lack access", and "the system couldn't
//! decide" apart. Messages carry no policy detail; full context goes to
//! the logs instead.

use permissions::PermissionError;
use thiserror::Error;

/// Errors surfaced by authorization checks.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// No principal could be resolved from the request context.
    ///
    /// Maps to an authentication-category failure (401) in whatever
    /// transport wraps the engine.
    #[error("No authenticated principal")]
    Unauthenticated,

    /// The principal was resolved and the ability built, but a required
    /// rule was not satisfied.
    ///
    /// Intentionally carries no detail about which rule failed.
    #[error("Forbidden")]
    Forbidden,

    /// The ability could not be built or evaluated, typically because
    /// rule storage was unreachable.
    ///
    /// Surfaced as an opaque internal error; the underlying cause is
    /// logged where the failure occurred.
    #[error("Permission check failed: {0}")]
    PermissionCheck(String),
}

impl From<PermissionError> for AuthzError {
    fn from(err: PermissionError) -> Self {
        AuthzError::PermissionCheck(err.to_string())
    }
}

/// A specialized Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;
