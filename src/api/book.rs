use crate::model::book::Book;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct BookPayload {
    #[schema(example = "Bumi Manusia")]
    pub title: Option<String>,
    #[schema(example = "Pramoedya Ananta Toer")]
    pub author: Option<String>,
}

impl BookPayload {
    /// Both fields are required and must be non-blank
    fn validated(&self) -> Option<(&str, &str)> {
        let title = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let author = self.author.as_deref().map(str::trim).filter(|a| !a.is_empty())?;
        Some((title, author))
    }
}

fn required_fields() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "message": "title and author are required"
    }))
}

#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "All books", body = [Book])
    ),
    tag = "Books"
)]
pub async fn list_books(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let books = sqlx::query_as::<_, Book>("SELECT id, title, author FROM books ORDER BY id")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list books");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(books))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(
        ("id" = i64, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Book found", body = Book),
        (status = 404, description = "Book not found")
    ),
    tag = "Books"
)]
pub async fn get_book(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let book_id = path.into_inner();

    let book = sqlx::query_as::<_, Book>("SELECT id, title, author FROM books WHERE id = ?")
        .bind(book_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, book_id, "Failed to fetch book");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match book {
        Some(book) => Ok(HttpResponse::Ok().json(book)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Book not found"
        }))),
    }
}

#[utoipa::path(
    post,
    path = "/api/books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Missing title or author")
    ),
    tag = "Books"
)]
pub async fn create_book(
    pool: web::Data<SqlitePool>,
    payload: web::Json<BookPayload>,
) -> actix_web::Result<impl Responder> {
    let Some((title, author)) = payload.validated() else {
        return Ok(required_fields());
    };

    let result = sqlx::query("INSERT INTO books (title, author) VALUES (?, ?)")
        .bind(title)
        .bind(author)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create book");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(Book {
        id: result.last_insert_rowid(),
        title: title.to_string(),
        author: author.to_string(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(
        ("id" = i64, Path, description = "Book id")
    ),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = Object, example = json!({
            "message": "Book updated successfully"
        })),
        (status = 400, description = "Missing title or author"),
        (status = 404, description = "Book not found")
    ),
    tag = "Books"
)]
pub async fn update_book(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<BookPayload>,
) -> actix_web::Result<impl Responder> {
    let book_id = path.into_inner();

    let Some((title, author)) = payload.validated() else {
        return Ok(required_fields());
    };

    let result = sqlx::query("UPDATE books SET title = ?, author = ? WHERE id = ?")
        .bind(title)
        .bind(author)
        .bind(book_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, book_id, "Failed to update book");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Book not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Book updated successfully",
        "book": Book {
            id: book_id,
            title: title.to_string(),
            author: author.to_string(),
        }
    })))
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(
        ("id" = i64, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Book deleted", body = Object, example = json!({
            "message": "Book deleted successfully"
        })),
        (status = 404, description = "Book not found")
    ),
    tag = "Books"
)]
pub async fn delete_book(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let book_id = path.into_inner();

    let book = sqlx::query_as::<_, Book>("SELECT id, title, author FROM books WHERE id = ?")
        .bind(book_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, book_id, "Failed to fetch book");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(book) = book else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Book not found"
        })));
    };

    sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(book_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, book_id, "Failed to delete book");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Book deleted successfully",
        "deleted": book,
    })))
}
