use axum::{Json, extract::State};

use crate::db::{InventoryItem, UserProfile};
use crate::middleware::AuthUser;
use crate::{PortalError, router::PortalState};

/// GET /api/user/me
pub async fn me(
    State(state): State<PortalState>,
    caller: AuthUser,
) -> Result<Json<UserProfile>, PortalError> {
    let user = state
        .storage
        .get_user(caller.id)
        .await?
        .ok_or(PortalError::NotFound("user"))?;
    Ok(Json(user.into()))
}

/// GET /api/user/inventory -> owned items with their equip flag.
pub async fn inventory(
    State(state): State<PortalState>,
    caller: AuthUser,
) -> Result<Json<Vec<InventoryItem>>, PortalError> {
    Ok(Json(state.storage.list_inventory(caller.id).await?))
}
