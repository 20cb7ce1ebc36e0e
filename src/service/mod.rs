pub mod accounts;
pub mod auth;
pub mod inventory;
pub mod rewards;

pub use accounts::{AccountOps, Session};
pub use auth::{Claims, TokenService};
pub use inventory::InventoryOps;
pub use rewards::{RewardOps, RewardTarget};
