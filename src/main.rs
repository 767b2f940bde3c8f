mod auth;
mod shared;
mod user;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use shared::AppState;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user::repository::InMemoryUserRepository;
// use user::repository::PostgresUserRepository; // For production

use auth::service::AuthService;
use auth::token::TokenConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sociable=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sociable backend");

    // Signing secret and token ttl are loaded once at boot; no runtime rotation
    let token_config = TokenConfig::from_env();

    // Create shared application state with dependency injection
    // Easy to switch between implementations:
    let user_repository = Arc::new(InMemoryUserRepository::new());

    // For production with PostgreSQL:
    // let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    // let pool = sqlx::PgPool::connect(&database_url).await.expect("Failed to connect to database");
    // let user_repository = Arc::new(PostgresUserRepository::new(pool));

    let auth_service = Arc::new(AuthService::new(user_repository.clone(), token_config));
    let app_state = AppState::new(auth_service, user_repository);

    // Routes behind the auth gate
    let protected = Router::new()
        .route("/api/user/logout", post(auth::logout))
        .route("/api/user/me", get(auth::me))
        .route_layer(from_fn_with_state(app_state.clone(), auth::require_auth));

    let app = Router::new()
        .route("/", get(|| async { "sociable" }))
        .route("/api/user/register", post(auth::register))
        .route("/api/user/login", post(auth::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3002").await.unwrap();
    info!("Server running on http://localhost:3002");
    axum::serve(listener, app).await.unwrap();
}
