use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use sociable::{
    auth::{self, password::PasswordHasher, service::AuthService, token::TokenConfig},
    shared::AppState,
    user::repository::InMemoryUserRepository,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Wraps a fully wired router over an in-memory user store and exposes the
/// auth endpoints as plain method calls.
pub struct TestApp {
    app: Router,
    pub repository: Arc<InMemoryUserRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryUserRepository::new());
        let token_config = TokenConfig::new(
            "workflow-test-secret".to_string(),
            chrono::Duration::hours(2),
        );
        // Low work factor: hashing strength is not under test here
        let auth_service = Arc::new(AuthService::with_hasher(
            repository.clone(),
            token_config,
            PasswordHasher::with_cost(4),
        ));
        let state = AppState::new(auth_service, repository.clone());

        let protected = Router::new()
            .route("/api/user/logout", post(auth::logout))
            .route("/api/user/me", get(auth::me))
            .route_layer(from_fn_with_state(state.clone(), auth::require_auth));

        let app = Router::new()
            .route("/api/user/register", post(auth::register))
            .route("/api/user/login", post(auth::login))
            .merge(protected)
            .with_state(state);

        Self { app, repository }
    }

    pub async fn register(&self, email: &str, password: &str) -> StatusCode {
        let body = json!({
            "first_name": "Test",
            "last_name": "User",
            "email": email,
            "password": password,
        });
        self.post_json("/api/user/register", body, None).await.status()
    }

    /// Logs in and returns (status, token, response body)
    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Option<String>, Value) {
        let body = json!({ "email": email, "password": password });
        let response = self.post_json("/api/user/login", body, None).await;
        let status = response.status();
        let value = body_json(response).await;
        let token = value
            .get("token")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string());
        (status, token, value)
    }

    pub async fn me(&self, token: Option<&str>) -> StatusCode {
        let mut builder = Request::builder().method("GET").uri("/api/user/me");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).unwrap();
        self.app.clone().oneshot(request).await.unwrap().status()
    }

    pub async fn logout(&self, token: &str) -> StatusCode {
        self.post_json("/api/user/logout", json!({}), Some(token))
            .await
            .status()
    }

    async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.app.clone().oneshot(request).await.unwrap()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
