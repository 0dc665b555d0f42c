//! Book management service

use crate::{
    error::AppResult,
    models::book::{Book, NewBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_page(&self, page: i64) -> AppResult<Vec<Book>> {
        self.repository.books.list_page(page).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn list_by_author(&self, author: Option<&str>) -> AppResult<Vec<Book>> {
        self.repository.books.list_by_author(author).await
    }

    pub async fn create(&self, data: &NewBook) -> AppResult<Book> {
        let book = self
            .repository
            .books
            .create(data)
            .await
            .map_err(|e| e.persistence("Error creating book"))?;
        tracing::info!("Created book id={}", book.id);
        Ok(book)
    }

    pub async fn update(&self, id: i64, data: &NewBook) -> AppResult<Book> {
        let book = self
            .repository
            .books
            .update(id, data)
            .await
            .map_err(|e| e.persistence("Error updating book"))?;
        tracing::info!("Updated book id={}", id);
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository
            .books
            .delete(id)
            .await
            .map_err(|e| e.persistence("Error deleting book"))?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }
}
