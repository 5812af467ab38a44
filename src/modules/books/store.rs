//! Book storage collaborators

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sqlx::PgPool;
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use super::models::{Book, BookId, NewBook};

const BOOK_COLUMNS: &str = "id, title, author, created_at, updated_at, deleted_at";

/// Opaque storage failure; callers never inspect the cause.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("book store lock poisoned")]
    Poisoned,
}

/// Persistence contract the book service relies on.
///
/// Only rows without a soft-delete marker are ever returned.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persist a new book, returning it with its assigned id and timestamps.
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError>;

    /// Look up a live book.
    async fn find_live(&self, id: BookId) -> Result<Option<Book>, StoreError>;

    /// Every live book, ordered by id.
    async fn list_live(&self) -> Result<Vec<Book>, StoreError>;

    /// Write title and author back and refresh `updated_at`.
    /// `None` when the row is no longer live.
    async fn save(&self, book: &Book) -> Result<Option<Book>, StoreError>;

    /// Mark a live book deleted. `false` when there was no live row.
    async fn soft_delete(&self, id: BookId) -> Result<bool, StoreError>;
}

/// Postgres-backed store over the `books` table.
#[derive(Debug, Clone)]
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
        let sql = format!(
            "INSERT INTO books (title, author) VALUES ($1, $2) RETURNING {}",
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, Book>(&sql)
            .bind(book.title)
            .bind(book.author)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_live(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        let sql = format!(
            "SELECT {} FROM books WHERE id = $1 AND deleted_at IS NULL",
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_live(&self) -> Result<Vec<Book>, StoreError> {
        let sql = format!(
            "SELECT {} FROM books WHERE deleted_at IS NULL ORDER BY id",
            BOOK_COLUMNS
        );
        let rows = sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn save(&self, book: &Book) -> Result<Option<Book>, StoreError> {
        // clock_timestamp() rather than now(): now() is frozen per transaction
        let sql = format!(
            r#"
            UPDATE books
            SET title = $2,
                author = $3,
                updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, Book>(&sql)
            .bind(book.id)
            .bind(&book.title)
            .bind(&book.author)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn soft_delete(&self, id: BookId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE books SET deleted_at = clock_timestamp() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: BookId,
    rows: BTreeMap<BookId, Book>,
}

/// In-process store with the same visibility rules as [`PgBookStore`].
///
/// Deleted rows are kept with their marker set so ids are never reused.
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    state: Mutex<MemoryState>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}

/// Current time, forced strictly past `previous` when the clock has not moved.
fn next_timestamp(previous: OffsetDateTime) -> OffsetDateTime {
    OffsetDateTime::now_utc().max(previous + Duration::microseconds(1))
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
        let mut state = self.state()?;
        state.last_id += 1;

        let now = OffsetDateTime::now_utc();
        let stored = Book {
            id: state.last_id,
            title: book.title,
            author: book.author,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_live(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        let state = self.state()?;
        Ok(state.rows.get(&id).filter(|book| book.is_live()).cloned())
    }

    async fn list_live(&self) -> Result<Vec<Book>, StoreError> {
        let state = self.state()?;
        Ok(state
            .rows
            .values()
            .filter(|book| book.is_live())
            .cloned()
            .collect())
    }

    async fn save(&self, book: &Book) -> Result<Option<Book>, StoreError> {
        let mut state = self.state()?;
        let Some(stored) = state.rows.get_mut(&book.id).filter(|row| row.is_live()) else {
            return Ok(None);
        };

        stored.title = book.title.clone();
        stored.author = book.author.clone();
        stored.updated_at = next_timestamp(stored.updated_at);
        Ok(Some(stored.clone()))
    }

    async fn soft_delete(&self, id: BookId) -> Result<bool, StoreError> {
        let mut state = self.state()?;
        match state.rows.get_mut(&id).filter(|row| row.is_live()) {
            Some(stored) => {
                stored.deleted_at = Some(OffsetDateTime::now_utc());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Anonymous".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryBookStore::new();
        let first = store.insert(new_book("One")).await.unwrap();
        let second = store.insert(new_book("Two")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created_at, first.updated_at);
        assert!(first.is_live());
    }

    #[tokio::test]
    async fn deleted_rows_are_hidden_and_ids_not_reused() {
        let store = MemoryBookStore::new();
        let book = store.insert(new_book("Gone")).await.unwrap();

        assert!(store.soft_delete(book.id).await.unwrap());
        assert!(!store.soft_delete(book.id).await.unwrap());
        assert!(store.find_live(book.id).await.unwrap().is_none());
        assert!(store.list_live().await.unwrap().is_empty());
        assert!(store.save(&book).await.unwrap().is_none());

        let next = store.insert(new_book("Next")).await.unwrap();
        assert_eq!(next.id, book.id + 1);
    }

    #[tokio::test]
    async fn save_refreshes_updated_at_only() {
        let store = MemoryBookStore::new();
        let mut book = store.insert(new_book("Draft")).await.unwrap();
        book.title = "Final".to_string();

        let saved = store.save(&book).await.unwrap().unwrap();
        assert_eq!(saved.title, "Final");
        assert_eq!(saved.created_at, book.created_at);
        assert!(saved.updated_at > book.updated_at);

        let again = store.save(&saved).await.unwrap().unwrap();
        assert!(again.updated_at > saved.updated_at);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = MemoryBookStore::new();
        for title in ["A", "B", "C"] {
            store.insert(new_book(title)).await.unwrap();
        }
        store.soft_delete(2).await.unwrap();

        let ids: Vec<BookId> = store
            .list_live()
            .await
            .unwrap()
            .into_iter()
            .map(|book| book.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn next_timestamp_moves_forward_from_future_values() {
        let future = OffsetDateTime::now_utc() + Duration::hours(1);
        assert_eq!(next_timestamp(future), future + Duration::microseconds(1));
    }
}
