use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app() -> Router {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(Arc::new(engine))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn create_account(app: &Router, id: i64, balance: f64) {
    let (status, _) = send(
        app,
        post(
            "/api/v1/accounts",
            json!({ "account_id": id, "balance": balance }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn create_and_read_account() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post(
            "/api/v1/accounts",
            json!({ "account_id": 111, "balance": 1000 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "account_id": 111, "balance": 1000.0 }));

    let (status, body) = send(&app, get("/api/v1/accounts/111")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "account_id": 111, "balance": 1000.0 }));
}

#[tokio::test]
async fn duplicate_account_is_409() {
    let app = app().await;
    create_account(&app, 111, 1000.0).await;

    let (status, body) = send(
        &app,
        post(
            "/api/v1/accounts",
            json!({ "account_id": 111, "balance": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_EXISTS");
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn unknown_account_is_404() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/v1/accounts/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "account not found");
}

#[tokio::test]
async fn malformed_account_id_is_400() {
    let app = app().await;

    let (status, body) = send(&app, get("/api/v1/accounts/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, _) = send(&app, get("/api/v1/accounts/0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transfer_updates_both_accounts() {
    let app = app().await;
    create_account(&app, 111, 1000.0).await;
    create_account(&app, 222, 500.0).await;

    let (status, body) = send(
        &app,
        post(
            "/api/v1/transactions",
            json!({
                "source_account_id": 111,
                "destination_account_id": 222,
                "amount": 100.50
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, Value::Null);

    let (_, body) = send(&app, get("/api/v1/accounts/111")).await;
    assert_eq!(body["balance"], 899.5);
    let (_, body) = send(&app, get("/api/v1/accounts/222")).await;
    assert_eq!(body["balance"], 600.5);
}

#[tokio::test]
async fn insufficient_balance_is_400() {
    let app = app().await;
    create_account(&app, 111, 1000.0).await;
    create_account(&app, 222, 500.0).await;

    let (status, body) = send(
        &app,
        post(
            "/api/v1/transactions",
            json!({
                "source_account_id": 111,
                "destination_account_id": 222,
                "amount": 2000
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_FUNDS");
    assert_eq!(body["message"], "insufficient balance");

    let (_, body) = send(&app, get("/api/v1/accounts/111")).await;
    assert_eq!(body["balance"], 1000.0);
}

#[tokio::test]
async fn malformed_transfer_body_is_400() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post("/api/v1/transactions", json!({ "source_account_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn missing_account_in_transfer_is_500_without_detail() {
    let app = app().await;
    create_account(&app, 111, 1000.0).await;

    let (status, body) = send(
        &app,
        post(
            "/api/v1/transactions",
            json!({
                "source_account_id": 111,
                "destination_account_id": 999,
                "amount": 1
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert_eq!(body["message"], "internal server error");
}
