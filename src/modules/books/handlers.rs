//! Request handlers, one data-access call each.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use bookshelf_http::{ApiResponse, AppError};

use super::models::{Book, CreateBook};
use super::repository::SharedBookRepository;

type JsonResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// `GET /api/books`
pub async fn list_books(State(repository): State<SharedBookRepository>) -> JsonResult<Vec<Book>> {
    let books = repository
        .find_all()
        .await
        .map_err(|e| AppError::bad_request("Could not get books", e))?;

    Ok(Json(ApiResponse::with_data(
        "Books fetched successfully",
        books,
    )))
}

/// `GET /api/get_book/{id}`
///
/// An id with no live book is still a 200, with `data: null`.
pub async fn get_book(
    State(repository): State<SharedBookRepository>,
    Path(id): Path<String>,
) -> JsonResult<Option<Book>> {
    let id = require_id(id)?;

    let book = repository
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::bad_request("Could not get book with id", e))?;

    Ok(Json(ApiResponse::with_data(
        "Book fetched successfully",
        book,
    )))
}

/// `POST /api/create_book`
///
/// The created row is not echoed back.
pub async fn create_book(
    State(repository): State<SharedBookRepository>,
    payload: Result<Json<CreateBook>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AppError> {
    let Json(book) = payload.map_err(|e| AppError::unprocessable("Request failed", e))?;

    let created = repository
        .insert(book)
        .await
        .map_err(|e| AppError::bad_request("Could not create book", e))?;

    tracing::info!(book_id = created.id, "book created");
    Ok((StatusCode::CREATED, Json(ApiResponse::message("Book added"))))
}

/// `DELETE /api/delete_book/{id}`
pub async fn delete_book(
    State(repository): State<SharedBookRepository>,
    Path(id): Path<String>,
) -> JsonResult<Option<Book>> {
    let id = require_id(id)?;

    let deleted = repository
        .delete(&id)
        .await
        .map_err(|e| AppError::bad_request("Could not delete book", e))?;

    if let Some(book) = &deleted {
        tracing::info!(book_id = book.id, "book deleted");
    }

    Ok(Json(ApiResponse::with_data(
        "Book deleted successfully",
        deleted,
    )))
}

/// Bound to the id-less forms of the id routes.
pub async fn id_required() -> AppError {
    AppError::missing_param("ID")
}

fn require_id(id: String) -> Result<String, AppError> {
    if id.is_empty() {
        return Err(AppError::missing_param("ID"));
    }
    Ok(id)
}
