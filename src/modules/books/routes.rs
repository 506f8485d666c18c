use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers;
use super::repository::SharedBookRepository;

/// Route table for the books module, relative to `/api`.
pub fn router(repository: SharedBookRepository) -> Router {
    Router::new()
        .route("/books", get(handlers::list_books))
        .route("/get_book/{id}", get(handlers::get_book))
        .route("/get_book/", get(handlers::id_required))
        .route("/create_book", post(handlers::create_book))
        .route("/delete_book/{id}", delete(handlers::delete_book))
        .route("/delete_book/", delete(handlers::id_required))
        .with_state(repository)
}
