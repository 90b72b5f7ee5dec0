use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use super::create_router;
use super::response::USER_HEADER;
use crate::testutil::test_state;

fn request(method: &str, uri: &str, user: Uuid, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_HEADER, user.to_string());
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn new_book(title: &str, text: &str) -> Value {
    json!({
        "title": title,
        "author": "Someone",
        "content": format!("{{\"text\":\"{text}\"}}"),
        "content_text": text,
    })
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _rx) = test_state(&dir);
    let app = create_router(state);

    let req = Request::builder()
        .uri("/_internal/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _rx) = test_state(&dir);
    let app = create_router(state);

    let req = Request::builder()
        .uri("/books")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "fail");
}

#[tokio::test]
async fn test_create_then_get_book() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _rx) = test_state(&dir);
    let app = create_router(state);
    let user = Uuid::new_v4();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/books/picks",
            user,
            Some(new_book("Cosmos", "galaxies galaxies stars")),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["kind"], "book");
    assert_eq!(body["data"]["picks_count"], 1);
    let book_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request("GET", &format!("/books/{book_id}"), user, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Cosmos");
    assert_eq!(body["data"]["picks"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["topics"][0]["label"], "galaxies");
}

#[tokio::test]
async fn test_other_users_book_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _rx) = test_state(&dir);
    let app = create_router(state);
    let owner = Uuid::new_v4();

    let (_, body) = send(
        &app,
        request("POST", "/books/picks", owner, Some(new_book("Mine", "private notes"))),
    )
    .await;
    let book_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request("GET", &format!("/books/{book_id}"), Uuid::new_v4(), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["data"]["message"], "Book not found");
}

#[tokio::test]
async fn test_invalid_reorder_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _rx) = test_state(&dir);
    let app = create_router(state);
    let user = Uuid::new_v4();

    let (_, body) = send(
        &app,
        request("POST", "/books/picks", user, Some(new_book("Order", "first excerpt"))),
    )
    .await;
    let book_id = body["data"]["id"].as_str().unwrap().to_string();
    let pick_id = body["data"]["picks"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request(
            "PUT",
            &format!("/books/{book_id}"),
            user,
            Some(json!({ "picks": [{ "guid": pick_id, "index": 3 }] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_last_pick_removes_book() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _rx) = test_state(&dir);
    let app = create_router(state);
    let user = Uuid::new_v4();

    let (_, body) = send(
        &app,
        request("POST", "/books/picks", user, Some(new_book("Short", "only excerpt"))),
    )
    .await;
    let book_id = body["data"]["id"].as_str().unwrap().to_string();
    let pick_id = body["data"]["picks"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request(
            "DELETE",
            &format!("/books/{book_id}/picks/{pick_id}"),
            user,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_last_pick"], true);

    let (status, _) = send(
        &app,
        request("GET", &format!("/books/{book_id}"), user, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_books_and_topics() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _rx) = test_state(&dir);
    let app = create_router(state);
    let user = Uuid::new_v4();

    for (title, text) in [("One", "planets planets"), ("Two", "poetry poetry")] {
        send(
            &app,
            request("POST", "/books/picks", user, Some(new_book(title, text))),
        )
        .await;
    }

    let (status, body) = send(&app, request("GET", "/books?limit=10", user, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 2);

    let (_, body) = send(
        &app,
        request("GET", "/books?topics=poetry", user, None),
    )
    .await;
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["title"], "Two");

    let (_, body) = send(&app, request("GET", "/topics", user, None)).await;
    assert_eq!(body["data"][0]["label"], "all");
    assert_eq!(body["data"][0]["count"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_search_requires_query() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _rx) = test_state(&dir);
    let app = create_router(state);

    let (status, _) = send(&app, request("GET", "/search", Uuid::new_v4(), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purge() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _rx) = test_state(&dir);
    let app = create_router(state);
    let user = Uuid::new_v4();

    send(
        &app,
        request("POST", "/books/picks", user, Some(new_book("Gone", "soon deleted"))),
    )
    .await;

    let (status, body) = send(&app, request("DELETE", "/admin/purge", user, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["books_deleted"], 1);
    assert_eq!(body["data"]["picks_deleted"], 1);
}
