use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{BookRepository, RepositoryError};
use crate::modules::books::models::{Book, CreateBook};

/// Book store kept in process memory, for tests.
///
/// Mirrors the PostgreSQL store: ids count up from 1, deletes are soft, and
/// ids that are not integers are rejected.
#[derive(Default)]
pub struct InMemoryBookRepository {
    state: RwLock<State>,
    unavailable: bool,
}

#[derive(Default)]
struct State {
    last_id: i64,
    books: Vec<Book>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the database were gone.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable {
            return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

fn parse_id(id: &str) -> Result<i64, RepositoryError> {
    id.trim()
        .parse()
        .map_err(|_| RepositoryError::InvalidId(id.to_string()))
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn find_all(&self) -> Result<Vec<Book>, RepositoryError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .books
            .iter()
            .filter(|book| book.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, RepositoryError> {
        self.check_available()?;
        let id = parse_id(id)?;
        let state = self.state.read().await;
        Ok(state
            .books
            .iter()
            .find(|book| book.id == id && book.deleted_at.is_none())
            .cloned())
    }

    async fn insert(&self, book: CreateBook) -> Result<Book, RepositoryError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        state.last_id += 1;

        let now = OffsetDateTime::now_utc();
        let stored = Book {
            id: state.last_id,
            author: Some(book.author),
            title: Some(book.title),
            publisher: Some(book.publisher),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.books.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<Option<Book>, RepositoryError> {
        self.check_available()?;
        let id = parse_id(id)?;
        let mut state = self.state.write().await;

        let Some(book) = state
            .books
            .iter_mut()
            .find(|book| book.id == id && book.deleted_at.is_none())
        else {
            return Ok(None);
        };

        book.deleted_at = Some(OffsetDateTime::now_utc());
        Ok(Some(book.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str) -> CreateBook {
        CreateBook {
            author: "Ursula K. Le Guin".into(),
            title: title.into(),
            publisher: "Ace".into(),
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_in_order() {
        let repository = InMemoryBookRepository::new();

        let first = repository.insert(payload("The Dispossessed")).await.unwrap();
        let second = repository.insert(payload("The Lathe of Heaven")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn deleted_books_are_hidden_and_not_deleted_twice() {
        let repository = InMemoryBookRepository::new();
        let book = repository.insert(payload("Lavinia")).await.unwrap();

        let deleted = repository.delete("1").await.unwrap().unwrap();
        assert_eq!(deleted.id, book.id);
        assert!(deleted.deleted_at.is_some());
        assert_eq!(deleted.updated_at, book.updated_at);

        assert!(repository.find_by_id("1").await.unwrap().is_none());
        assert!(repository.find_all().await.unwrap().is_empty());
        assert!(repository.delete("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected() {
        let repository = InMemoryBookRepository::new();

        let err = repository.find_by_id("abc").await.unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidId(id) if id == "abc"));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let repository = InMemoryBookRepository::unavailable();

        assert!(repository.find_all().await.is_err());
        assert!(repository.insert(payload("Tehanu")).await.is_err());
    }
}
