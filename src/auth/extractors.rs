use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{error::ApiError, state::AppState, users::User};

/// Caller resolved from a bearer token; the account must exist, be unlocked,
/// and still hold the role the token was signed with.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        let claims = JwtKeys::from_ref(state).verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token for unknown user");
                ApiError::Unauthorized("User not found".into())
            })?;

        if claims.role != user.role {
            warn!(user_id = %user.id, token_role = ?claims.role, role = ?user.role, "stale token role");
            return Err(ApiError::Unauthorized("Token role is out of date".into()));
        }

        if user.is_locked {
            warn!(user_id = %user.id, "locked account");
            return Err(ApiError::Forbidden("Account is locked".into()));
        }

        Ok(AuthUser(user))
    }
}

/// `AuthUser` whose role may search other accounts.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.can_search_users() {
            warn!(user_id = %user.id, role = ?user.role, "insufficient role");
            return Err(ApiError::Forbidden("Insufficient role".into()));
        }
        Ok(AdminUser(user))
    }
}
