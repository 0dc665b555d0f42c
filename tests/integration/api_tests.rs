//! API integration tests
//!
//! Requests go straight into the router backed by an in-memory database.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use books_api::{api, config::AppConfig, db, AppState};

async fn app() -> Router {
    let pool = db::connect_in_memory().await.expect("Failed to open database");
    api::router(AppState::new(AppConfig::default(), pool))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = send(app, Method::GET, uri, None).await;
    (status, serde_json::from_str(&body).expect("Failed to parse response"))
}

async fn create(app: &Router, book: Value) -> Value {
    let (status, body) = send(app, Method::POST, "/api/books", Some(book)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let body: Value = serde_json::from_str(&body).unwrap();
    body["data"].clone()
}

#[tokio::test]
async fn test_service_identity() {
    let app = app().await;
    let (status, body) = get_json(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"name": "BooksAPI", "version": "1.0.0"}));
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = app().await;

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_book() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"title": "Dune", "price": 12.5})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_str(&body).unwrap();
    let id = body["data"]["id"].as_i64().expect("No book ID");
    assert_eq!(
        body,
        json!({
            "message": "Book created successfully!",
            "data": {
                "id": id,
                "title": "Dune",
                "author": null,
                "description": null,
                "price": 12.5
            }
        })
    );
}

#[tokio::test]
async fn test_create_then_get() {
    let app = app().await;
    let created = create(
        &app,
        json!({
            "title": "Dune",
            "price": 12.5,
            "author": "Frank Herbert",
            "description": "Desert planet"
        }),
    )
    .await;

    let (status, body) = get_json(&app, &format!("/api/books/{}", created["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_get_book_as_xml() {
    let app = app().await;
    let created = create(&app, json!({"title": "Dune", "price": 12.5})).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/books/{}?format=xml", created["id"]))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.starts_with("<?xml"));
    assert!(body.contains("<title>Dune</title>"));
    assert!(body.contains("<price>12.5</price>"));
}

#[tokio::test]
async fn test_get_missing_book() {
    let app = app().await;
    let (status, body) = get_json(&app, "/api/books/424242").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Book not found"}));
}

#[tokio::test]
async fn test_unknown_format_is_rejected() {
    let app = app().await;
    create(&app, json!({"title": "Dune", "price": 12.5})).await;

    for uri in [
        "/api/books/?format=csv",
        "/api/books/1?format=csv",
        "/api/books/get/by-author?format=yaml",
        "/api/books/?format=",
    ] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, json!({"message": "Unknown data format"}), "{}", uri);
    }
}

#[tokio::test]
async fn test_list_books_paginates() {
    let app = app().await;
    for i in 0..105 {
        create(&app, json!({"title": format!("Book {}", i), "price": i})).await;
    }

    let (status, first) = get_json(&app, "/api/books/").await;
    assert_eq!(status, StatusCode::OK);
    let first = first.as_array().unwrap().clone();
    assert_eq!(first.len(), 100);
    assert_eq!(first[0]["title"], "Book 0");

    let (_, second) = get_json(&app, "/api/books?page=2").await;
    let second = second.as_array().unwrap();
    assert_eq!(second.len(), 5);
    assert_eq!(second[0]["title"], "Book 100");

    let (status, past_end) = get_json(&app, "/api/books/?page=9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(past_end, json!([]));
}

#[tokio::test]
async fn test_list_books_as_xml() {
    let app = app().await;
    create(&app, json!({"title": "Dune", "price": 12.5})).await;
    create(&app, json!({"title": "Emma", "price": 8})).await;

    let (status, body) = send(&app, Method::GET, "/api/books/?format=xml", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.matches("<item>").count(), 2);
    assert!(body.contains("<title>Emma</title>"));
}

#[tokio::test]
async fn test_empty_page_reads_first_page() {
    let app = app().await;
    let created = create(&app, json!({"title": "Dune", "price": 12.5})).await;

    for uri in ["/api/books/?page=", "/api/books/?page=&format=json", "/api/books/?page=0"] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, json!([created.clone()]), "{}", uri);
    }
}

#[tokio::test]
async fn test_invalid_page_is_rejected() {
    let app = app().await;
    let (status, body) = get_json(&app, "/api/books/?page=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_create_validation() {
    let app = app().await;

    for payload in [
        json!({"price": 10.0}),
        json!({"title": "   ", "price": 10.0}),
        json!({"title": "Dune"}),
        json!({"title": "Dune", "price": -1}),
        json!({"title": "Dune", "price": "cheap"}),
    ] {
        let (status, body) = send(&app, Method::POST, "/api/books", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", payload);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert!(body["message"].is_string(), "{}", payload);
    }

    let (_, books) = get_json(&app, "/api/books/").await;
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/books")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"title\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_book() {
    let app = app().await;
    let created = create(
        &app,
        json!({"title": "Dune", "price": 12.5, "author": "Frank Herbert"}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/books/{}", id),
        Some(json!({"title": "Dune Messiah", "price": 14})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        body,
        json!({
            "message": "Book updated successfully",
            "data": {
                "id": id,
                "title": "Dune Messiah",
                "author": null,
                "description": null,
                "price": 14.0
            }
        })
    );

    let (_, fetched) = get_json(&app, &format!("/api/books/{}", id)).await;
    assert_eq!(fetched, body["data"]);
}

#[tokio::test]
async fn test_update_missing_book() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/books/999999",
        Some(json!({"title": "Ghost", "price": 1.0})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"message": "Book not found"}));

    let (_, books) = get_json(&app, "/api/books/").await;
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn test_delete_book() {
    let app = app().await;
    let created = create(&app, json!({"title": "Dune", "price": 12.5})).await;
    let uri = format!("/api/books/{}", created["id"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({"message": "Book deleted successfully"})
    );

    let (status, _) = get_json(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"message": "Book not found"}));
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let app = app().await;
    let (status, body) = get_json(&app, "/api/books/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_books_by_author() {
    let app = app().await;
    create(&app, json!({"title": "Dune", "price": 12.5, "author": "Frank Herbert"})).await;
    create(&app, json!({"title": "Children of Dune", "price": 13, "author": "Frank Herbert"})).await;
    create(&app, json!({"title": "Emma", "price": 8, "author": "Jane Austen"})).await;
    create(&app, json!({"title": "Anonymous", "price": 1})).await;

    let (status, body) = get_json(&app, "/api/books/get/by-author?author=Frank%20Herbert").await;
    assert_eq!(status, StatusCode::OK);
    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert!(books.iter().all(|b| b["author"] == "Frank Herbert"));

    let (_, body) = get_json(&app, "/api/books/get/by-author?author=Frank").await;
    assert_eq!(body, json!([]));

    let (_, body) = get_json(&app, "/api/books/get/by-author").await;
    assert_eq!(body.as_array().unwrap().len(), 4);

    for uri in ["/api/books/get/by-author?author=", "/api/books/get/by-author?author=0"] {
        let (_, body) = get_json(&app, uri).await;
        assert_eq!(body.as_array().unwrap().len(), 4, "{}", uri);
    }
}

#[tokio::test]
async fn test_catalog_download() {
    let app = app().await;
    create(&app, json!({"title": "Dune", "price": 12.5})).await;
    create(&app, json!({"title": "Emma", "price": 8})).await;
    create(&app, json!({"title": "Ulysses", "price": 19.99})).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/books/get/catalog")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"catalog.csv\""
    );
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(body, "Dune, 12.5\nEmma, 8\nUlysses, 19.99\n");
}

#[tokio::test]
async fn test_catalog_of_empty_store() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/books/get/catalog", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
}
