//! Book error taxonomy and its HTTP mapping

use bookshelf_http::{extract::validation_details, AppError};
use thiserror::Error;
use validator::ValidationErrors;

use super::store::StoreError;

/// Failure kind exposed to callers as a machine-readable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationFailure,
    InvalidIdentifier,
    NotFound,
    StorageFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationFailure => "validation_failure",
            ErrorKind::InvalidIdentifier => "invalid_identifier",
            ErrorKind::NotFound => "not_found",
            ErrorKind::StorageFailure => "storage_failure",
        }
    }
}

#[derive(Debug, Error)]
pub enum BookError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid book id {0:?}")]
    InvalidIdentifier(String),

    #[error("book not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl BookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookError::Validation(_) => ErrorKind::ValidationFailure,
            BookError::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            BookError::NotFound => ErrorKind::NotFound,
            BookError::Storage(_) => ErrorKind::StorageFailure,
        }
    }
}

impl From<BookError> for AppError {
    fn from(error: BookError) -> Self {
        let kind = error.kind();
        let app_error = match error {
            BookError::Validation(errors) => {
                AppError::validation(validation_details(&errors), "Validation failed")
            }
            BookError::InvalidIdentifier(id) => {
                AppError::bad_request(format!("Invalid book ID: {:?}", id))
            }
            BookError::NotFound => AppError::not_found("Book not found"),
            BookError::Storage(source) => AppError::internal(source),
        };
        app_error.with_code(kind.as_str())
    }
}
