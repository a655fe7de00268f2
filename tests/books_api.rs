//! HTTP-level tests for the books endpoints, backed by the in-memory store.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookshelf_app::{build_registry, modules::books::store::InMemoryBookStore};
use bookshelf_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

const BOOKS: &str = "/api/v1/books";

fn app() -> Router {
    let settings = Settings::default();
    let registry = build_registry(&settings, Arc::new(InMemoryBookStore::new())).unwrap();
    bookshelf_http::build_router(&registry, &settings)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn dune() -> Value {
    json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "genre": "Science Fiction",
        "publicationDate": "1965-08-01",
        "edition": "First",
        "summary": "Desert planet politics."
    })
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, json) = call(app, Method::POST, BOOKS, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["book"].clone()
}

#[tokio::test]
async fn created_book_echoes_input_and_is_retrievable() {
    let app = app();
    let input = dune();

    let (status, body) = call(&app, Method::POST, BOOKS, Some(input.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["code"], 201);
    assert_eq!(body["message"], "Book created successfully");

    let book = &body["data"]["book"];
    for key in ["title", "author", "genre", "publicationDate", "edition", "summary"] {
        assert_eq!(book[key], input[key], "field {key}");
    }
    assert_eq!(book["available"], true);

    let id = book["id"].as_str().unwrap();
    let (status, fetched) = call(&app, Method::GET, &format!("{BOOKS}/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["message"], "Book retrieved successfully");
    assert_eq!(&fetched["data"]["book"], book);
}

#[tokio::test]
async fn create_missing_mandatory_field_is_400_keyed_by_field() {
    let app = app();
    for field in ["title", "author", "genre", "publicationDate"] {
        let mut input = dune();
        input.as_object_mut().unwrap().remove(field);

        let (status, body) = call(&app, Method::POST, BOOKS, Some(input)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "Validation failed");
        assert!(body["errors"][field].is_string(), "missing key {field}: {body}");
        assert_eq!(body["errors"].as_object().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn create_with_blank_title_hits_storage_constraint() {
    let app = app();
    let mut input = dune();
    input["title"] = json!("   ");

    let (status, body) = call(&app, Method::POST, BOOKS, Some(input)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["title"], "Title is required");
}

#[tokio::test]
async fn list_second_page_of_twelve() {
    let app = app();
    for i in 1..=12 {
        let mut input = dune();
        input["title"] = json!(format!("Book {i}"));
        create(&app, input).await;
    }

    let (status, body) = call(&app, Method::GET, &format!("{BOOKS}?page=2&limit=5"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Books retrieved successfully");

    let books = body["data"]["books"].as_array().unwrap();
    assert_eq!(books.len(), 5);
    assert_eq!(books[0]["title"], "Book 7");

    let pagination = &body["data"]["pagination"];
    assert_eq!(pagination["current_page"], 2);
    assert_eq!(pagination["per_page"], 5);
    assert_eq!(pagination["total_pages"], 3);
    assert_eq!(pagination["total_books"], 12);

    assert_eq!(body["links"]["self"], "/api/v1/books?page=2&limit=5");
    assert_eq!(body["links"]["prev"], "/api/v1/books?page=1&limit=5");
    assert_eq!(body["links"]["next"], "/api/v1/books?page=3&limit=5");
}

#[tokio::test]
async fn list_defaults_on_empty_catalog() {
    let app = app();
    let (status, body) = call(&app, Method::GET, &format!("{BOOKS}?page=abc"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["books"], json!([]));
    assert_eq!(body["data"]["pagination"]["current_page"], 1);
    assert_eq!(body["data"]["pagination"]["per_page"], 10);
    assert_eq!(body["data"]["pagination"]["total_pages"], 0);
    assert!(body["links"]["next"].is_null());
    assert!(body["links"]["prev"].is_null());
}

#[tokio::test]
async fn unknown_id_is_404_everywhere() {
    let app = app();
    let missing = format!("{BOOKS}/65a1f0c2e4b0a1b2c3d4e5f6");

    let attempts = [
        (Method::GET, missing.clone(), None),
        (Method::PUT, missing.clone(), Some(json!({ "summary": "x" }))),
        (
            Method::PATCH,
            format!("{missing}/availability"),
            Some(json!({ "available": false })),
        ),
        (Method::DELETE, missing.clone(), None),
        (Method::GET, format!("{BOOKS}/not-an-object-id"), None),
    ];

    for (method, uri, body) in attempts {
        let (status, json) = call(&app, method.clone(), &uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Book not found");
        assert_eq!(json["errors"]["details"], "The requested book does not exist.");
    }
}

#[tokio::test]
async fn non_boolean_availability_is_rejected_without_mutation() {
    let app = app();
    let book = create(&app, dune()).await;
    let uri = format!("{BOOKS}/{}", book["id"].as_str().unwrap());

    let (status, body) = call(
        &app,
        Method::PATCH,
        &format!("{uri}/availability"),
        Some(json!({ "available": "yes" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"]["details"],
        "The 'available' field must be a boolean value."
    );

    let (_, fetched) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched["data"]["book"]["available"], true);
    assert_eq!(fetched["data"]["book"]["updatedAt"], book["updatedAt"]);
}

#[tokio::test]
async fn availability_without_json_body_is_400() {
    let app = app();
    let book = create(&app, dune()).await;
    let uri = format!("{BOOKS}/{}/availability", book["id"].as_str().unwrap());

    let (status, body) = call(&app, Method::PATCH, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(
        body["errors"]["details"],
        "The 'available' field must be a boolean value."
    );

    let request = Request::builder()
        .method(Method::PATCH)
        .uri(&uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("available=false"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_, fetched) = call(&app, Method::GET, &format!("{BOOKS}/{}", book["id"].as_str().unwrap()), None).await;
    assert_eq!(fetched["data"]["book"]["available"], true);
}

#[tokio::test]
async fn availability_toggles() {
    let app = app();
    let book = create(&app, dune()).await;
    let uri = format!("{BOOKS}/{}/availability", book["id"].as_str().unwrap());

    let (status, body) = call(&app, Method::PATCH, &uri, Some(json!({ "available": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book availability updated successfully");
    assert_eq!(body["data"]["book"]["available"], false);
    assert_eq!(body["data"]["book"]["title"], "Dune");
}

#[tokio::test]
async fn delete_then_delete_again() {
    let app = app();
    let book = create(&app, dune()).await;
    let uri = format!("{BOOKS}/{}", book["id"].as_str().unwrap());

    let (status, body) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book deleted successfully");
    assert!(body.as_object().unwrap().contains_key("data"));
    assert!(body["data"].is_null());

    let (status, body) = call(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book not found");
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let app = app();
    let book = create(&app, dune()).await;
    let uri = format!("{BOOKS}/{}", book["id"].as_str().unwrap());

    let (status, body) = call(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "summary": "A new summary." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book updated successfully");

    let updated = &body["data"]["book"];
    assert_eq!(updated["summary"], "A new summary.");
    for key in ["id", "title", "author", "genre", "publicationDate", "edition", "available", "createdAt"] {
        assert_eq!(updated[key], book[key], "field {key}");
    }
}

#[tokio::test]
async fn update_with_bad_types_is_400() {
    let app = app();
    let book = create(&app, dune()).await;
    let uri = format!("{BOOKS}/{}", book["id"].as_str().unwrap());

    let (status, body) = call(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "title": 7, "publicationDate": "someday" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["title"], "Title must be a string");
    assert_eq!(body["errors"]["publicationDate"], "Invalid publication date format");
}

#[tokio::test]
async fn malformed_json_gets_error_envelope() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri(BOOKS)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\":"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn module_health_and_openapi_are_served() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("{BOOKS}/health"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, spec) = call(&app, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/api/v1/books"]["get"].is_object());
    assert!(spec["paths"]["/api/v1/books/{id}/availability"]["patch"].is_object());
    assert!(spec["components"]["schemas"]["Book"].is_object());
}
