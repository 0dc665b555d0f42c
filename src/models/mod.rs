//! Data models for the Books API

pub mod book;

pub use book::{Book, BookPayload, CatalogEntry, NewBook};
