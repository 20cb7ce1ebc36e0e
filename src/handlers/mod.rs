pub mod admin;
pub mod auth;
pub mod avatar;
pub mod game;
pub mod messages;
pub mod shop;
pub mod user;
