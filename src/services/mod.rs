//! Business logic services

pub mod books;
pub mod catalog;

use crate::{config::ExportConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub catalog: catalog::CatalogExporter,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, export_config: ExportConfig) -> Self {
        Self {
            books: books::BooksService::new(repository.clone()),
            catalog: catalog::CatalogExporter::new(repository.clone(), export_config.temp_dir),
            repository,
        }
    }

    /// Check that the database answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
