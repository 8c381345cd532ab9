use crate::{auth::verify_jwt, error::AppError, state::AppState};
use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

/// Gate for the sweep trigger. A no-op unless `SWEEP_JWT_SECRET` is set.
pub async fn trigger_auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(secret) = state.config.jwt_secret.as_deref() else {
        return Ok(next.run(req).await);
    };

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = verify_jwt(token, secret)?;
    tracing::debug!(role = ?claims.role, "Sweep trigger authorized");

    Ok(next.run(req).await)
}
