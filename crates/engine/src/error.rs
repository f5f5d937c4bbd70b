//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Unauthorized`] thrown when credentials or a session do not resolve to a user.
//! - [`Forbidden`] thrown when a user acts outside its cost center scope.
//! - [`KeyNotFound`] thrown when an item is not found.
//!
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
    #[error("Malformed file: {0}")]
    MalformedFile(String),
    #[error("batch rejected: {} row error(s)", .0.len())]
    BatchRejected(Vec<String>),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidEntry(a), Self::InvalidEntry(b)) => a == b,
            (Self::MalformedFile(a), Self::MalformedFile(b)) => a == b,
            (Self::BatchRejected(a), Self::BatchRejected(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
