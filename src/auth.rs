//! # Authentication and Authorization
//!
//! Bearer JWT authentication for protected API endpoints plus the per-route
//! role allow-list check. The middleware validates the token signature and
//! expiry, then loads the user row so role and team membership are current —
//! claims are not trusted for authorization data.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, forbidden, unauthorized};
use crate::models::{Role, user};
use crate::repositories::UserRepository;
use crate::server::AppState;

/// JWT claims carried by bearer tokens. Only identity and expiry; role and
/// team are loaded from the database per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's UUID
    pub sub: Uuid,
    /// Expiry as a unix timestamp
    pub exp: usize,
}

/// The authenticated user for the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

/// Authentication middleware: validates the bearer JWT and resolves the user.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    let secret = state
        .config
        .jwt_secret
        .as_deref()
        .ok_or_else(|| unauthorized(Some("Authentication is not configured")))?;

    let decoded = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|err| {
        tracing::debug!(error = %err, "JWT validation failed");
        unauthorized(Some("Invalid or expired token"))
    })?;

    let repo = UserRepository::new(&state.db);
    let user = repo
        .find_by_id(decoded.claims.sub)
        .await?
        .ok_or_else(|| unauthorized(Some("Unknown user")))?;

    tracing::debug!(user_id = %user.id, role = ?user.role, "Authenticated request");
    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))
        .and_then(|value| {
            value
                .to_str()
                .map_err(|_| unauthorized(Some("Invalid Authorization header")))
        })
        .and_then(|header| {
            header
                .strip_prefix("Bearer ")
                .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
        })
}

/// Role allow-list check, layered per route group after `auth_middleware`.
/// Denial is 403: the caller is known, just not permitted.
pub async fn authorize_roles(
    request: Request,
    next: Next,
    allowed: &'static [Role],
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| unauthorized(Some("Authentication required")))?;

    if !allowed.contains(&user.0.role) {
        return Err(forbidden(Some("Role not permitted for this endpoint")));
    }

    Ok(next.run(request).await)
}

impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| unauthorized(Some("Authentication required")))
    }
}
