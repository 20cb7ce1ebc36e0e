use axum::{Json, extract::State};

use crate::middleware::{ApiJson, AuthUser};
use crate::types::api::{EquipRequest, EquipResponse, EquippedItemsResponse, SaveStateResponse};
use crate::{PortalError, router::PortalState};

/// GET /api/avatar -> live equipped items, read from the inventory.
pub async fn current(
    State(state): State<PortalState>,
    caller: AuthUser,
) -> Result<Json<EquippedItemsResponse>, PortalError> {
    let equipped_items = state.storage.list_equipped(caller.id).await?;
    Ok(Json(EquippedItemsResponse { equipped_items }))
}

/// POST /api/avatar/equip
pub async fn equip(
    State(state): State<PortalState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<EquipRequest>,
) -> Result<Json<EquipResponse>, PortalError> {
    let equipped_items = state
        .inventory
        .equip(caller.id, req.item_id, req.item_type)
        .await?;
    Ok(Json(EquipResponse {
        success: true,
        equipped_items,
    }))
}

/// POST /api/avatar/save-state
pub async fn save_state(
    State(state): State<PortalState>,
    caller: AuthUser,
) -> Result<Json<SaveStateResponse>, PortalError> {
    let saved = state.inventory.save_state(caller.id).await?;
    Ok(Json(SaveStateResponse {
        success: true,
        state: saved,
    }))
}

/// GET /api/avatar/load-state
pub async fn load_state(
    State(state): State<PortalState>,
    caller: AuthUser,
) -> Result<Json<EquippedItemsResponse>, PortalError> {
    let equipped_items = state.inventory.load_state(caller.id).await?;
    Ok(Json(EquippedItemsResponse { equipped_items }))
}
