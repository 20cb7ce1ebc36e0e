//! Request and response bodies of the JSON API. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::db::{Item, SlotType};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRequest {
    pub item_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyResponse {
    pub success: bool,
    pub new_balance: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipRequest {
    pub item_id: i64,
    pub item_type: SlotType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipResponse {
    pub success: bool,
    pub equipped_items: Vec<Item>,
}

#[derive(Debug, Serialize)]
pub struct SaveStateResponse {
    pub success: bool,
    pub state: Vec<Item>,
}

/// Body of both `GET /api/avatar` (live) and `GET /api/avatar/load-state` (snapshot).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquippedItemsResponse {
    pub equipped_items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinsRequest {
    pub coins: i64,
    pub reward_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinsResponse {
    pub success: bool,
    pub coins: i64,
    pub new_balance: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: SlotType,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<SlotType>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRewardRequest {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub all_users: bool,
    pub text: String,
    #[serde(default)]
    pub coins: i64,
}

#[derive(Debug, Serialize)]
pub struct SendRewardResponse {
    pub success: bool,
    pub recipients: u64,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
