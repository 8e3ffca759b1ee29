mod helpers;

use axum::http::StatusCode;
use helpers::{send, stub_router, STUB_DIM};

#[tokio::test]
async fn unknown_path_returns_json_404() {
    let (app, _encoder) = stub_router();

    let (status, body) = send(app, "POST", "/embeddings", Some(r#"{"text": "x"}"#)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(body["message"].as_str().unwrap().contains("/embeddings"));
}

#[tokio::test]
async fn get_on_embed_returns_json_405() {
    let (app, encoder) = stub_router();

    let (status, body) = send(app, "GET", "/embed", None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "method_not_allowed");
    assert!(body["message"].as_str().unwrap().contains("GET"));
    assert_eq!(encoder.call_count(), 0);
}

#[tokio::test]
async fn post_on_health_returns_json_405() {
    let (app, _encoder) = stub_router();

    let (status, body) = send(app, "POST", "/health", Some("{}")).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "method_not_allowed");
}

#[tokio::test]
async fn health_reports_model_and_dimension() {
    let (app, _encoder) = stub_router();

    let (status, body) = send(app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "stub-model");
    assert_eq!(body["dimension"], STUB_DIM as u64);
}

#[tokio::test]
async fn root_path_is_not_a_route() {
    let (app, _encoder) = stub_router();

    let (status, body) = send(app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
