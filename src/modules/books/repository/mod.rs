//! Data access for books.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Book, CreateBook};

#[cfg(any(test, feature = "testkit"))]
mod memory;
mod postgres;

#[cfg(any(test, feature = "testkit"))]
pub use memory::InMemoryBookRepository;
pub use postgres::PgBookRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid book id '{0}'")]
    InvalidId(String),
}

/// Explicit queries over the `books` table.
///
/// Ids arrive as the raw path segment; converting them to the identity type
/// is the store's job, and a value it cannot convert is an error.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Every book that has not been deleted, oldest first
    async fn find_all(&self) -> Result<Vec<Book>, RepositoryError>;

    /// `None` when no live book has this id
    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, RepositoryError>;

    /// Insert a book and return the stored row
    async fn insert(&self, book: CreateBook) -> Result<Book, RepositoryError>;

    /// Mark a book deleted and return the row as it was marked, `None` when
    /// no live book has this id
    async fn delete(&self, id: &str) -> Result<Option<Book>, RepositoryError>;
}

pub type SharedBookRepository = Arc<dyn BookRepository>;
