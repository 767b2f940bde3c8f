use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::types::BearerToken;
use crate::shared::{AppError, AppState};

/// Auth gate middleware: extracts the bearer credential, verifies signature
/// and ttl, and confirms session-set membership before the handler runs.
/// Usage: .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth))
/// Handlers can then extract Extension(claims): Extension<Claims>.
///
/// Every rejection is the same uniform AccessDenied; the real cause is only
/// logged.
#[instrument(skip(state, req, next))]
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    debug!(uri = %req.uri(), "Auth gate triggered");

    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header");
            AppError::AccessDenied("Access denied".to_string())
        })?;

    // Owned copy so the header borrow ends before the request is mutated
    let token = auth_header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            warn!("Authorization header is not a bearer credential");
            AppError::AccessDenied("Access denied".to_string())
        })?
        .to_string();

    // Signature, ttl, and session-set membership in one pass; must fully
    // succeed before the wrapped handler runs
    let claims = state.auth_service.authenticate(&token).await?;

    debug!(user_id = %claims.sub, "Request admitted");

    req.extensions_mut().insert(BearerToken(token));
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
