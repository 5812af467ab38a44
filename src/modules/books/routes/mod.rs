//! HTTP handlers for the Books module

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::{ApiResponse, AppError, ValidatedJson};

use super::{
    models::{Book, CreateBookRequest, UpdateBookRequest},
    service::BookService,
};

type HandlerResult<T> = Result<T, AppError>;

/// Routes relative to the module mount point
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(service)
}

async fn create_book(
    State(service): State<BookService>,
    ValidatedJson(request): ValidatedJson<CreateBookRequest>,
) -> HandlerResult<(StatusCode, Json<ApiResponse<Book>>)> {
    let book = service.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Book created successfully", book)),
    ))
}

async fn list_books(State(service): State<BookService>) -> HandlerResult<Json<ApiResponse<Vec<Book>>>> {
    let books = service.list().await?;
    Ok(Json(ApiResponse::new("Books retrieved successfully", books)))
}

async fn get_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> HandlerResult<Json<ApiResponse<Book>>> {
    let book = service.get_by_id(&id).await?;
    Ok(Json(ApiResponse::new("Book retrieved successfully", book)))
}

async fn update_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateBookRequest>,
) -> HandlerResult<Json<ApiResponse<Book>>> {
    let book = service.update(&id, request).await?;
    Ok(Json(ApiResponse::new("Book updated successfully", book)))
}

async fn delete_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> HandlerResult<Json<ApiResponse<()>>> {
    service.delete(&id).await?;
    Ok(Json(ApiResponse::message("Book deleted successfully")))
}
