//! Shared helpers for router tests: an in-memory app with a canned feed.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use heatwatch::feed::WeatherFeed;
use heatwatch::store::MemoryStore;
use heatwatch::{routes, AppContext, Config, Error, Result};

/// Feed returning a fixed document, or a network failure when `None`.
pub struct StubFeed(pub Option<Value>);

#[async_trait]
impl WeatherFeed for StubFeed {
    async fn fetch(&self) -> Result<Value> {
        self.0
            .clone()
            .ok_or_else(|| Error::Network("connection refused".into()))
    }
}

/// Build a router over a fresh memory store. The store is returned so tests
/// can inspect what was written.
pub fn build_test_app(feed: StubFeed, config: Config) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let ctx = AppContext::new(store.clone(), store.clone(), Arc::new(feed), config);
    (routes::router(ctx), store)
}

/// A feed document with one entry per `(timestamp, air_temp, rel_hum)`,
/// newest first.
pub fn feed_doc(entries: &[(&str, f64, f64)]) -> Value {
    let data: Vec<Value> = entries
        .iter()
        .map(|(ts, temp, hum)| {
            json!({
                "name": "Brisbane",
                "local_date_time_full": ts,
                "air_temp": temp,
                "rel_hum": hum,
            })
        })
        .collect();
    json!({ "observations": { "header": [], "data": data } })
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post(app: Router, uri: &str, body: Option<&str>) -> Response<Body> {
    send(app, Method::POST, uri, body, None).await
}

pub async fn put(app: Router, uri: &str, body: &str, bearer: Option<&str>) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), bearer).await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
    bearer: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_owned())).unwrap_or_else(Body::empty))
        .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
