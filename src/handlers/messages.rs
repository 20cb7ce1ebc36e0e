use axum::{
    Json,
    extract::{Path, State},
};

use crate::db::Message;
use crate::middleware::AuthUser;
use crate::types::api::SuccessResponse;
use crate::{PortalError, router::PortalState};

/// GET /api/messages -> the caller's inbox, newest first.
pub async fn list(
    State(state): State<PortalState>,
    caller: AuthUser,
) -> Result<Json<Vec<Message>>, PortalError> {
    Ok(Json(state.storage.list_messages(caller.id).await?))
}

/// POST /api/messages/{id}/read
pub async fn mark_read(
    State(state): State<PortalState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, PortalError> {
    state.storage.mark_message_read(caller.id, id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
