#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use prodtrack_api::{config::AppConfig, db, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper harness for spinning up the full router backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as [`TestApp::new`] with a chance to adjust the configuration first.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // one connection keeps the in-memory database alive and shared
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = prodtrack_api::build_router(state.clone());

        Self { router, state }
    }

    /// Send a request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.request(Method::DELETE, uri, None).await
    }

    /// Asserts the status and returns the `data` field of the success envelope.
    pub async fn expect_data(&self, response: Response, status: StatusCode) -> Value {
        let json = expect_status(response, status).await;
        assert_eq!(json["success"], true, "unexpected envelope: {json}");
        json["data"].clone()
    }

    pub async fn seed_employee(&self, name: &str, position: &str) -> Value {
        let response = self
            .post(
                "/api/v1/employees",
                json!({ "name": name, "position": position }),
            )
            .await;
        self.expect_data(response, StatusCode::CREATED).await
    }

    pub async fn seed_process(&self, name: &str) -> Value {
        let response = self
            .post("/api/v1/processes", json!({ "name": name }))
            .await;
        self.expect_data(response, StatusCode::CREATED).await
    }

    pub async fn seed_product(&self, name: &str) -> Value {
        let response = self
            .post("/api/v1/products", json!({ "name": name }))
            .await;
        self.expect_data(response, StatusCode::CREATED).await
    }

    /// Creates a record with only the identifying fields and an entered quantity.
    pub async fn seed_record(&self, product: &str, process: &str, actual_qty: &str) -> Value {
        let response = self
            .post(
                "/api/v1/records",
                json!({
                    "date": "2024-06-03",
                    "name": "Ann",
                    "product": product,
                    "process": process,
                    "actual_qty": actual_qty,
                }),
            )
            .await;
        self.expect_data(response, StatusCode::CREATED).await
    }

    pub async fn save_plan(&self, plan: Value) -> Value {
        let response = self.post("/api/v1/production-plans", plan).await;
        self.expect_data(response, StatusCode::OK).await
    }
}

/// Reads the body as JSON; empty bodies become `Value::Null`.
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("body is not JSON")
}

pub async fn expect_status(response: Response, status: StatusCode) -> Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {json}");
    json
}
