//! Books repository for database operations

use sqlx::{Pool, Sqlite};
use tokio_stream::Stream;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CatalogEntry, NewBook},
};

/// Rows per page of `list_page`
pub const ITEMS_PER_PAGE: i64 = 100;

/// Row cap of `list_by_author`
pub const AUTHOR_LIMIT: i64 = 1000;

fn not_found() -> AppError {
    AppError::NotFound("Book not found".to_string())
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author, description, price FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(not_found)
    }

    /// One page of books in insertion order. Pages start at 1; anything lower
    /// is read as the first page.
    pub async fn list_page(&self, page: i64) -> AppResult<Vec<Book>> {
        let offset = (page.max(1) - 1).saturating_mul(ITEMS_PER_PAGE);

        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, description, price
            FROM books
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(ITEMS_PER_PAGE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Books whose author matches exactly, or any books when no author is given.
    /// `""` and `"0"` count as no author.
    pub async fn list_by_author(&self, author: Option<&str>) -> AppResult<Vec<Book>> {
        let author = author.filter(|a| !a.is_empty() && *a != "0");

        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, author, description, price
            FROM books
            WHERE ?1 IS NULL OR author = ?1
            ORDER BY id
            LIMIT ?2
            "#,
        )
        .bind(author)
        .bind(AUTHOR_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a book and return it with its new id
    pub async fn create(&self, data: &NewBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, description, price)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, author, description, price
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.description)
        .bind(data.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Overwrite every field of an existing book
    pub async fn update(&self, id: i64, data: &NewBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = ?, author = ?, description = ?, price = ?
            WHERE id = ?
            RETURNING id, title, author, description, price
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.description)
        .bind(data.price)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(not_found)
    }

    /// Delete book
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Lazily stream the title and price of every book.
    ///
    /// Rows are pulled from the cursor as the stream is polled; the table is
    /// never loaded as a whole.
    pub fn stream_catalog(&self) -> impl Stream<Item = Result<CatalogEntry, sqlx::Error>> + '_ {
        sqlx::query_as::<_, CatalogEntry>("SELECT title, price FROM books ORDER BY id")
            .fetch(&self.pool)
    }
}
