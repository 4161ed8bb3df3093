#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use server::{routes::build_router, state::AppState};

/// Router over a fresh, migrated SQLite in-memory database.
pub async fn app() -> anyhow::Result<Router> {
    let db = models::db::connect_in_memory().await?;
    Ok(build_router(AppState::from_db(db), CorsLayer::very_permissive()))
}

pub fn app_with_state(state: AppState) -> Router {
    build_router(state, CorsLayer::very_permissive())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|e| panic!("not json ({e}): {}", self.body))
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default()
    }
}

pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: Body,
) -> anyhow::Result<TestResponse> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        req = req.header(header::CONTENT_TYPE, ct);
    }
    let res = app.clone().oneshot(req.body(body)?).await?;
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = to_bytes(res.into_body(), usize::MAX).await?;
    Ok(TestResponse { status, headers, body: String::from_utf8(bytes.to_vec())? })
}

pub async fn get(app: &Router, uri: &str) -> anyhow::Result<TestResponse> {
    send_raw(app, "GET", uri, None, Body::empty()).await
}

pub async fn delete(app: &Router, uri: &str) -> anyhow::Result<TestResponse> {
    send_raw(app, "DELETE", uri, None, Body::empty()).await
}

pub async fn post_json(app: &Router, uri: &str, json: Value) -> anyhow::Result<TestResponse> {
    send_raw(app, "POST", uri, Some("application/json"), Body::from(json.to_string())).await
}

pub async fn put_json(app: &Router, uri: &str, json: Value) -> anyhow::Result<TestResponse> {
    send_raw(app, "PUT", uri, Some("application/json"), Body::from(json.to_string())).await
}

pub fn noms(list: &Value) -> Vec<String> {
    list.as_array()
        .map(|items| items.iter().filter_map(|v| v["nom"].as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}
