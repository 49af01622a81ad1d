#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use eraport::clock::FixedClock;
use eraport::router::init_router;
use eraport::store::MemoryStore;
use eraport::testing::{PeriodFixture, memory_state};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub clock: FixedClock,
}

/// App over an empty in-memory store.
pub fn empty_app() -> TestApp {
    let (state, store, clock) = memory_state();
    TestApp {
        router: init_router(state),
        store,
        clock,
    }
}

/// App with the two standard academic years seeded; 2025/2026 semester 1 is active.
pub async fn seeded_app() -> (TestApp, PeriodFixture) {
    let app = empty_app();
    let fixture = PeriodFixture::new();
    fixture.seed(&app.store).await;
    (app, fixture)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    send(router, request).await
}

pub async fn post_empty(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}
