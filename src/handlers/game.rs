use axum::{Json, extract::State};

use crate::middleware::{ApiJson, AuthUser};
use crate::types::api::{SendCoinsRequest, SendCoinsResponse};
use crate::{PortalError, router::PortalState};

/// POST /api/game/send-coins -> pays a game reward once per reward key.
pub async fn send_coins(
    State(state): State<PortalState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<SendCoinsRequest>,
) -> Result<Json<SendCoinsResponse>, PortalError> {
    let new_balance = state
        .rewards
        .claim_game_reward(caller.id, &req.reward_key, req.coins)
        .await?;
    Ok(Json(SendCoinsResponse {
        success: true,
        coins: req.coins,
        new_balance,
    }))
}
