//! SQL DDL for initializing the portal storage.

/// SQLite schema:
/// - `users.coins` carries a CHECK so no code path can drive a balance negative
/// - `inventory` is the user/item junction; `(user_id, item_id)` is UNIQUE
/// - `avatar_storage.user_id` is UNIQUE (one snapshot per user)
/// - `achievements (user_id, reward_key)` is UNIQUE (one payout per reward key)
/// - booleans are stored as INTEGER 0/1, timestamps as RFC3339 TEXT
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    username TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0,
    coins INTEGER NOT NULL DEFAULT 100 CHECK (coins >= 0),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    type TEXT NOT NULL CHECK (type IN ('hair', 'top', 'bottom', 'accessory', 'face')),
    price INTEGER NOT NULL DEFAULT 0 CHECK (price >= 0),
    image_url TEXT NOT NULL DEFAULT '',
    is_default INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS inventory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    item_id INTEGER NOT NULL REFERENCES items(id),
    equipped INTEGER NOT NULL DEFAULT 0,
    acquired_at TEXT NOT NULL,
    UNIQUE (user_id, item_id)
);

CREATE INDEX IF NOT EXISTS idx_inventory_user_equipped ON inventory(user_id, equipped);

CREATE TABLE IF NOT EXISTS avatar_storage (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    equipped_items TEXT NOT NULL DEFAULT '[]', -- JSON array
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS achievements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    reward_key TEXT NOT NULL,
    coins INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (user_id, reward_key)
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    text TEXT NOT NULL,
    coins INTEGER NOT NULL DEFAULT 0,
    is_read INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_user ON messages(user_id)
"#;

/// Catalog inserted when the `items` table is empty: `(name, type, image_url)`.
/// All of them are free default items.
pub const DEFAULT_ITEMS: &[(&str, &str, &str)] = &[
    ("Face 1", "face", "/assets/avatars/faces/default.png"),
    ("Face 2", "face", "/assets/avatars/faces/smiling.png"),
    ("T-shirt", "top", "/assets/avatars/tops/default.png"),
    ("Trousers", "bottom", "/assets/avatars/bottom/default.png"),
];
