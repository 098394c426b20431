//! HTTP client for integration testing.
//!
//! Drives the axum `Router` in-process with `oneshot`, no socket involved.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use market_core::common::MemberId;
use market_core::domains::auth::JwtService;
use market_core::kernel::ServerDeps;
use market_core::server::build_app;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub struct ApiClient {
    router: Router,
    jwt_service: Arc<JwtService>,
    token: Option<String>,
}

/// Status and parsed JSON body of one response.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// The `code` field of an error body.
    pub fn error_code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}

impl ApiClient {
    pub fn new(deps: ServerDeps, jwt_service: Arc<JwtService>) -> Self {
        Self {
            router: build_app(deps, &[]),
            jwt_service,
            token: None,
        }
    }

    /// Authenticate subsequent requests as `member_id`.
    pub fn as_member(mut self, member_id: MemberId) -> Self {
        self.token = Some(
            self.jwt_service
                .create_token(member_id)
                .expect("Failed to mint test token"),
        );
        self
    }

    pub async fn get(&self, uri: &str) -> ApiResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> ApiResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> ApiResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> ApiResponse {
        self.send(Method::DELETE, uri, None).await
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> ApiResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router returned an error");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        ApiResponse { status, body }
    }
}
