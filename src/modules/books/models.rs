use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use validator::Validate;

/// Storage-assigned book identifier.
pub type BookId = i64;

/// Persisted book record.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Book {
    /// Unique identifier, assigned on creation and never reused
    pub id: BookId,
    /// Sanitized title of the book
    pub title: String,
    /// Sanitized author of the book
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Refreshed on every successful update
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Soft-delete marker; set rows are invisible to every read
    #[serde(skip)]
    pub deleted_at: Option<OffsetDateTime>,
}

impl Book {
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Sanitized fields for a book that has not been stored yet.
///
/// The same length rules as the request payloads apply, re-checked after
/// sanitization since escaping can lengthen text and stripping can empty it.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
}

/// Request model for creating a new book.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookRequest {
    /// Title of the book
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Author of the book
    #[validate(length(min = 1, max = 255))]
    pub author: String,
}

/// Request model for replacing a book's title and author.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
}
