//! Book endpoints

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

use crate::{
    error::AppResult,
    models::book::{Book, BookPayload},
    services::catalog::CATALOG_FILE_NAME,
    AppState,
};

use super::{format::DataFormat, ApiJson, ApiPath, ApiQuery};

/// Query for the paginated listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Page number (default: 1)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    pub format: Option<String>,
}

/// Reads an empty query value (`?page=`) as absent.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorQuery {
    pub author: Option<String>,
    pub format: Option<String>,
}

/// `{message, data}` envelope returned by write endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Book>,
}

impl MessageResponse {
    fn new(message: &str, data: Option<Book>) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            data,
        })
    }
}

/// List books, 100 per page
pub async fn list_books(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> AppResult<Response> {
    let format = DataFormat::from_param(query.format.as_deref())?;
    let books = state.services.books.list_page(query.page.unwrap_or(1)).await?;
    format.many(&books)
}

/// Get book by ID
pub async fn get_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<FormatQuery>,
) -> AppResult<Response> {
    let format = DataFormat::from_param(query.format.as_deref())?;
    let book = state.services.books.get_by_id(id).await?;
    format.one(&book)
}

/// Create a new book
pub async fn create_book(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let data = payload.into_new_book()?;
    let book = state.services.books.create(&data).await?;
    Ok((
        StatusCode::CREATED,
        MessageResponse::new("Book created successfully!", Some(book)),
    ))
}

/// Replace every field of a book
pub async fn update_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> AppResult<Json<MessageResponse>> {
    let data = payload.into_new_book()?;
    let book = state.services.books.update(id, &data).await?;
    Ok(MessageResponse::new("Book updated successfully", Some(book)))
}

/// Delete a book
pub async fn delete_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.services.books.delete(id).await?;
    Ok(MessageResponse::new("Book deleted successfully", None))
}

/// Books by exact author, up to 1000
pub async fn get_books_by_author(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AuthorQuery>,
) -> AppResult<Response> {
    let format = DataFormat::from_param(query.format.as_deref())?;
    let books = state
        .services
        .books
        .list_by_author(query.author.as_deref())
        .await?;
    format.many(&books)
}

/// Download the `title, price` catalog as `catalog.csv`
pub async fn get_catalog(State(state): State<AppState>) -> AppResult<Response> {
    let file = state.services.catalog.export().await?;
    tracing::info!("Serving catalog with {} books", file.lines());

    let len = file.len();
    let body = Body::from_stream(file.into_stream().await?);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CATALOG_FILE_NAME),
            ),
        ],
        body,
    )
        .into_response())
}
