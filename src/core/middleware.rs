use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::errors::ApiError;
use crate::core::shared::models::{User, UserRole};
use crate::core::shared::schema::users;
use crate::core::shared::state::AppState;
use crate::security::jwt;

/// Authenticated user attached to the request by [`require_auth`].
#[derive(Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn role(&self) -> UserRole {
        self.0.role()
    }

    pub fn is_staff(&self) -> bool {
        self.0.is_staff()
    }

    pub fn require_any_role(&self, roles: &[UserRole]) -> Result<(), ApiError> {
        if roles.contains(&self.role()) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "You are not allowed to perform this action".into(),
            ))
        }
    }
}

fn bearer_token(request: &Request<Body>) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
}

/// Validates the bearer token, loads the account and stores it in request
/// extensions. Deactivated accounts are rejected even with a valid token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::Unauthorized("You are not logged in".into()))?;

    let claims = jwt::verify_token(&token, &state.config.auth.jwt_secret)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;

    let mut conn = state.conn.get()?;
    let user: Option<User> = users::table
        .filter(users::id.eq(user_id))
        .first(&mut conn)
        .optional()?;

    let user = user.ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    if !user.is_active {
        return Err(ApiError::Unauthorized("Account is deactivated".into()));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("You are not logged in".into()))
    }
}
