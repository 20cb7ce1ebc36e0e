//! Database module: models, schema and data access for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and their API shapes
//! - `schema.rs`: SQL DDL and the default catalog (SQLite)
//! - `sqlite.rs`: pool setup, read queries and the statement helpers
//!   shared by the transactional services

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{DbUser, InventoryItem, Item, Message, SlotType, UserProfile};
pub use schema::SQLITE_INIT;
pub use sqlite::{ItemPatch, NewItem, PortalStorage, SqlitePool};
