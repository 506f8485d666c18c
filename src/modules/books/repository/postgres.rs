use async_trait::async_trait;
use bookshelf_db::Database;

use super::{BookRepository, RepositoryError};
use crate::modules::books::models::{Book, CreateBook};

const FIND_ALL: &str = r#"
    SELECT id, author, title, publisher, created_at, updated_at, deleted_at
    FROM books
    WHERE deleted_at IS NULL
    ORDER BY id
"#;

// The id is bound as text and cast by PostgreSQL, so a non-numeric id is
// rejected by the database rather than here.
const FIND_BY_ID: &str = r#"
    SELECT id, author, title, publisher, created_at, updated_at, deleted_at
    FROM books
    WHERE id = $1::bigint AND deleted_at IS NULL
"#;

const INSERT: &str = r#"
    INSERT INTO books (author, title, publisher)
    VALUES ($1, $2, $3)
    RETURNING id, author, title, publisher, created_at, updated_at, deleted_at
"#;

const SOFT_DELETE: &str = r#"
    UPDATE books
    SET deleted_at = now()
    WHERE id = $1::bigint AND deleted_at IS NULL
    RETURNING id, author, title, publisher, created_at, updated_at, deleted_at
"#;

/// PostgreSQL-backed book store sharing the process-wide handle.
#[derive(Clone)]
pub struct PgBookRepository {
    db: Database,
}

impl PgBookRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn find_all(&self) -> Result<Vec<Book>, RepositoryError> {
        let books = sqlx::query_as::<_, Book>(FIND_ALL)
            .fetch_all(&self.db)
            .await?;
        Ok(books)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, RepositoryError> {
        let book = sqlx::query_as::<_, Book>(FIND_BY_ID)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(book)
    }

    async fn insert(&self, book: CreateBook) -> Result<Book, RepositoryError> {
        let book = sqlx::query_as::<_, Book>(INSERT)
            .bind(book.author)
            .bind(book.title)
            .bind(book.publisher)
            .fetch_one(&self.db)
            .await?;
        Ok(book)
    }

    async fn delete(&self, id: &str) -> Result<Option<Book>, RepositoryError> {
        let book = sqlx::query_as::<_, Book>(SOFT_DELETE)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(book)
    }
}
