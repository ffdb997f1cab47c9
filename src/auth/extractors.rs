use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;
use uuid::Uuid;

use super::{claims::TokenKind, jwt::{JwtKeys, TokenError}};
use crate::error::ApiError;

/// Identity resolved from an `Authorization: Bearer <access token>` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .map(|auth| {
                auth.strip_prefix("Bearer ")
                    .or_else(|| auth.strip_prefix("bearer "))
                    .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))
            })
            .transpose()?;

        match keys.verify(token, TokenKind::Access) {
            Ok(user_id) => Ok(AuthUser(user_id)),
            Err(TokenError::Missing) => Err(ApiError::Unauthorized("You are not logged in".into())),
            Err(e) => {
                warn!(error = %e, "rejected access token");
                Err(ApiError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}
