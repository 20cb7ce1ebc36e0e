use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::db::{Item, ItemPatch, NewItem, UserProfile};
use crate::middleware::{ApiJson, RequireAdmin};
use crate::service::RewardTarget;
use crate::types::api::{
    CreateItemRequest, SendRewardRequest, SendRewardResponse, UpdateItemRequest,
    UpdateUserRequest,
};
use crate::{PortalError, router::PortalState};

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<PortalState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<UserProfile>>, PortalError> {
    let users = state.storage.list_users().await?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// PATCH /api/admin/users/{id} -> grant or revoke admin rights.
pub async fn update_user(
    State(state): State<PortalState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserProfile>, PortalError> {
    let user = state.storage.set_admin(id, req.is_admin).await?;
    info!(admin_id = admin.id, user_id = id, is_admin = req.is_admin, "admin flag changed");
    Ok(Json(user.into()))
}

/// POST /api/admin/items
pub async fn create_item(
    State(state): State<PortalState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>), PortalError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(PortalError::Validation("name is required".to_string()));
    }
    if req.price < 0 {
        return Err(PortalError::Validation("price must not be negative".to_string()));
    }

    let item = state
        .storage
        .create_item(NewItem {
            name,
            slot: req.item_type,
            price: req.price,
            image_url: req.image_url,
            is_default: req.is_default,
        })
        .await?;
    info!(admin_id = admin.id, item_id = item.id, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/admin/items/{id} -> partial update; absent fields keep their value.
pub async fn update_item(
    State(state): State<PortalState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<UpdateItemRequest>,
) -> Result<Json<Item>, PortalError> {
    let name = req.name.map(|n| n.trim().to_string());
    if name.as_deref() == Some("") {
        return Err(PortalError::Validation("name must not be empty".to_string()));
    }
    if req.price.is_some_and(|p| p < 0) {
        return Err(PortalError::Validation("price must not be negative".to_string()));
    }

    let item = state
        .storage
        .update_item(
            id,
            ItemPatch {
                name,
                slot: req.item_type,
                price: req.price,
                image_url: req.image_url,
                is_default: req.is_default,
            },
        )
        .await?;
    info!(admin_id = admin.id, item_id = id, "item updated");
    Ok(Json(item))
}

/// POST /api/admin/send-reward -> coins plus an inbox message, for one user or everyone.
pub async fn send_reward(
    State(state): State<PortalState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(req): ApiJson<SendRewardRequest>,
) -> Result<Json<SendRewardResponse>, PortalError> {
    let target = match (req.all_users, req.user_id) {
        (true, _) => RewardTarget::AllUsers,
        (false, Some(user_id)) => RewardTarget::User(user_id),
        (false, None) => {
            return Err(PortalError::Validation(
                "either userId or allUsers is required".to_string(),
            ));
        }
    };
    let recipients = state
        .rewards
        .send_admin_reward(target, &req.text, req.coins)
        .await?;
    info!(admin_id = admin.id, recipients, "reward dispatched");
    Ok(Json(SendRewardResponse {
        success: true,
        recipients,
    }))
}
