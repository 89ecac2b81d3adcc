use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::auth::models::TokenKind;
use crate::domain::auth::models::UserClaims;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Claims of the verified bearer token, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserClaims);

/// Middleware that verifies the bearer access token and adds the caller's
/// claims to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let claims = state.token_provider.verify_token(token).map_err(|e| {
        tracing::warn!(error = %e, "Bearer token rejected");
        ApiError::Unauthorized("invalid or expired token".to_string()).into_response()
    })?;

    if claims.kind != TokenKind::Access {
        tracing::warn!(user_id = %claims.user_id, "Non-access token used as bearer");
        return Err(unauthorized("access token required"));
    }

    req.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("missing authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("invalid authorization header"))?;

    auth_str
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized("invalid authorization header format, expected: Bearer <token>"))
}

fn unauthorized(message: &str) -> Response {
    ApiError::Unauthorized(message.to_string()).into_response()
}
