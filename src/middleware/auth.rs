use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};

use crate::db::DbUser;
use crate::error::PortalError;
use crate::router::PortalState;

/// The caller identified by a valid `Authorization: Bearer <jwt>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
}

impl FromRequestParts<PortalState> for AuthUser {
    type Rejection = PortalError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PortalState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| PortalError::Unauthorized("missing bearer token"))?;
        let claims = state.tokens.verify(bearer.token())?;
        Ok(Self { id: claims.user_id()? })
    }
}

/// An authenticated caller whose account currently has the admin flag.
/// The flag is read from the database on every request.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub DbUser);

impl FromRequestParts<PortalState> for RequireAdmin {
    type Rejection = PortalError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PortalState,
    ) -> Result<Self, Self::Rejection> {
        let caller = AuthUser::from_request_parts(parts, state).await?;
        let user = state
            .storage
            .get_user(caller.id)
            .await?
            .ok_or(PortalError::Unauthorized("account no longer exists"))?;
        if !user.is_admin {
            return Err(PortalError::Forbidden);
        }
        Ok(Self(user))
    }
}
