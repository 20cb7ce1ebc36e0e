use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::config::Config;
use crate::db::PortalStorage;
use crate::handlers::{admin, auth, avatar, game, messages, shop, user};
use crate::service::{AccountOps, InventoryOps, RewardOps, TokenService};

/// Shared application state; every field is cheap to clone.
#[derive(Clone)]
pub struct PortalState {
    pub storage: PortalStorage,
    pub tokens: TokenService,
    pub accounts: AccountOps,
    pub inventory: InventoryOps,
    pub rewards: RewardOps,
}

impl PortalState {
    pub fn new(storage: PortalStorage, cfg: &Config) -> Self {
        let tokens = TokenService::new(&cfg.jwt_secret, cfg.token_ttl_hours);
        Self {
            accounts: AccountOps::new(storage.clone(), tokens.clone(), cfg),
            inventory: InventoryOps::new(storage.clone()),
            rewards: RewardOps::new(
                storage.clone(),
                cfg.max_game_reward,
                cfg.max_admin_reward,
            ),
            tokens,
            storage,
        }
    }
}

pub fn portal_router(state: PortalState) -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/check", get(auth::check))
        .route("/api/user/me", get(user::me))
        .route("/api/user/inventory", get(user::inventory))
        .route("/api/shop", get(shop::list_items))
        .route("/api/shop/buy", post(shop::buy))
        .route("/api/avatar", get(avatar::current))
        .route("/api/avatar/equip", post(avatar::equip))
        .route("/api/avatar/save-state", post(avatar::save_state))
        .route("/api/avatar/load-state", get(avatar::load_state))
        .route("/api/game/send-coins", post(game::send_coins))
        .route("/api/messages", get(messages::list))
        .route("/api/messages/{id}/read", post(messages::mark_read))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{id}", patch(admin::update_user))
        .route("/api/admin/items", post(admin::create_item))
        .route("/api/admin/items/{id}", put(admin::update_item))
        .route("/api/admin/send-reward", post(admin::send_reward))
        .with_state(state)
}
