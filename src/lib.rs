//! BooksAPI
//!
//! A REST API over a book catalog: paginated listing in JSON or XML,
//! CRUD by id, lookup by author and a streamed CSV catalog export.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire repository and services on top of an open pool
    pub fn new(config: AppConfig, pool: sqlx::SqlitePool) -> Self {
        let repository = repository::Repository::new(pool);
        let services = services::Services::new(repository, config.export.clone());
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
