//! Book service: sanitization, identifier resolution, and error
//! classification in front of the [`BookStore`].

use std::sync::Arc;

use validator::Validate;

use super::{
    errors::BookError,
    models::{Book, BookId, CreateBookRequest, NewBook, UpdateBookRequest},
    store::BookStore,
};
use crate::utils::{is_valid_identifier, sanitize};

/// Stateless orchestrator over an injected [`BookStore`].
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreateBookRequest) -> Result<Book, BookError> {
        let book = sanitized(&request.title, &request.author)?;
        let created = self.store.insert(book).await?;

        tracing::info!(book_id = created.id, "book created");
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<Book>, BookError> {
        Ok(self.store.list_live().await?)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Book, BookError> {
        self.resolve(id).await
    }

    pub async fn update(&self, id: &str, request: UpdateBookRequest) -> Result<Book, BookError> {
        let mut book = self.resolve(id).await?;
        let fields = sanitized(&request.title, &request.author)?;
        book.title = fields.title;
        book.author = fields.author;

        // The row can be deleted between resolve and save
        let saved = self.store.save(&book).await?.ok_or(BookError::NotFound)?;

        tracing::info!(book_id = saved.id, "book updated");
        Ok(saved)
    }

    pub async fn delete(&self, id: &str) -> Result<(), BookError> {
        let book = self.resolve(id).await?;
        if !self.store.soft_delete(book.id).await? {
            return Err(BookError::NotFound);
        }

        tracing::info!(book_id = book.id, "book deleted");
        Ok(())
    }

    /// Parse `id` and load the live book it names.
    async fn resolve(&self, id: &str) -> Result<Book, BookError> {
        let book_id = parse_identifier(id)?;
        self.store
            .find_live(book_id)
            .await?
            .ok_or(BookError::NotFound)
    }
}

/// Convert path text into a lookup key. Accepts only plain digit strings
/// that fit in 32 bits.
pub fn parse_identifier(id: &str) -> Result<BookId, BookError> {
    if !is_valid_identifier(id) {
        return Err(BookError::InvalidIdentifier(id.to_string()));
    }

    id.parse::<u32>()
        .map(BookId::from)
        .map_err(|_| BookError::InvalidIdentifier(id.to_string()))
}

fn sanitized(title: &str, author: &str) -> Result<NewBook, BookError> {
    let book = NewBook {
        title: sanitize(title),
        author: sanitize(author),
    };
    book.validate()?;
    Ok(book)
}
