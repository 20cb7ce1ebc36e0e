pub mod auth;
pub mod json;

pub use auth::{AuthUser, RequireAdmin};
pub use json::ApiJson;
