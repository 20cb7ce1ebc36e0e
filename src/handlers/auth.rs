use axum::{Json, extract::State, http::StatusCode};

use crate::middleware::{ApiJson, AuthUser};
use crate::types::api::{AuthResponse, CheckResponse, LoginRequest, RegisterRequest};
use crate::{PortalError, router::PortalState};

/// POST /api/auth/register -> creates the account and returns a token.
pub async fn register(
    State(state): State<PortalState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), PortalError> {
    let session = state
        .accounts
        .register(&req.email, &req.password, &req.username)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: session.token,
            username: session.username,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<PortalState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, PortalError> {
    let session = state.accounts.login(&req.email, &req.password).await?;
    Ok(Json(AuthResponse {
        token: session.token,
        username: session.username,
    }))
}

/// GET /api/auth/check -> who the token belongs to.
pub async fn check(
    State(state): State<PortalState>,
    caller: AuthUser,
) -> Result<Json<CheckResponse>, PortalError> {
    let user = state
        .storage
        .get_user(caller.id)
        .await?
        .ok_or(PortalError::NotFound("user"))?;
    Ok(Json(CheckResponse {
        username: user.username,
        email: user.email,
    }))
}
