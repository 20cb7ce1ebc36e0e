use axum::{Json, extract::State};

use crate::db::Item;
use crate::middleware::{ApiJson, AuthUser};
use crate::types::api::{BuyRequest, BuyResponse};
use crate::{PortalError, router::PortalState};

/// GET /api/shop -> the whole catalog.
pub async fn list_items(State(state): State<PortalState>) -> Result<Json<Vec<Item>>, PortalError> {
    Ok(Json(state.storage.list_items().await?))
}

/// POST /api/shop/buy
pub async fn buy(
    State(state): State<PortalState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<BuyRequest>,
) -> Result<Json<BuyResponse>, PortalError> {
    let new_balance = state.inventory.purchase(caller.id, req.item_id).await?;
    Ok(Json(BuyResponse {
        success: true,
        new_balance,
    }))
}
