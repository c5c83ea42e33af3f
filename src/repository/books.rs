//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(ErrorCode::NoSuchBook, format!("Book with id {} not found", id))
            })
    }

    /// Search books with optional substring filters, AND-combined.
    /// Absent filters match everything.
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut sql = String::from("SELECT * FROM books WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if let Some(ref title) = query.title {
            params.push(format!("%{}%", title));
            sql.push_str(&format!(" AND title ILIKE ${}", params.len()));
        }
        if let Some(ref author) = query.author {
            params.push(format!("%{}%", author));
            sql.push_str(&format!(" AND author ILIKE ${}", params.len()));
        }
        if let Some(ref category) = query.category {
            params.push(format!("%{}%", category));
            sql.push_str(&format!(" AND category ILIKE ${}", params.len()));
        }
        sql.push_str(" ORDER BY title");

        let mut q = sqlx::query_as::<_, Book>(&sql);
        for param in &params {
            q = q.bind(param);
        }

        let books = q.fetch_all(&self.pool).await?;
        Ok(books)
    }

    /// Create a new book; new books are available by default
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, category, available, copies, location)
            VALUES ($1, $2, $3, $4, TRUE, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.category)
        .bind(book.copies.unwrap_or(1))
        .bind(&book.location)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update an existing book (full replace of catalog fields)
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author = $2, isbn = $3, category = $4,
                available = $5, copies = $6, location = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.category)
        .bind(book.available)
        .bind(book.copies.unwrap_or(1))
        .bind(&book.location)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(ErrorCode::NoSuchBook, format!("Book with id {} not found", id))
        })
    }

    /// Delete a book. Loan history is never deleted, so a book with loan
    /// records cannot be removed without breaking referential integrity;
    /// the foreign-key violation is surfaced as a conflict.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::Conflict(
                        ErrorCode::Failure,
                        "Book has loan records and cannot be deleted".to_string(),
                    )
                }
                _ => AppError::Database(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                ErrorCode::NoSuchBook,
                format!("Book with id {} not found", id),
            ));
        }

        Ok(())
    }
}
