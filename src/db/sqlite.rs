use crate::db::models::{DbUser, InventoryItem, Item, Message, SlotType};
use crate::db::schema::{DEFAULT_ITEMS, SQLITE_INIT};
use crate::error::PortalError;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqliteExecutor};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

const USER_COLUMNS: &str = "id, email, password_hash, username, is_admin, coins, created_at";
const ITEM_COLUMNS: &str = "id, name, type, price, image_url, is_default";

/// Fields accepted when an admin creates an item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub slot: SlotType,
    pub price: i64,
    pub image_url: String,
    pub is_default: bool,
}

/// Partial item update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub slot: Option<SlotType>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Clone)]
pub struct PortalStorage {
    pool: SqlitePool,
}

impl PortalStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database, apply the schema and seed the catalog.
    pub async fn connect(database_url: &str) -> Result<Self, PortalError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(connect_opts)
            .await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        storage.seed_default_items().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), PortalError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert the default catalog when no items exist yet. Returns how many were inserted.
    pub async fn seed_default_items(&self) -> Result<usize, PortalError> {
        let mut tx = self.pool.begin().await?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
            .fetch_one(&mut *tx)
            .await?;
        if count > 0 {
            return Ok(0);
        }

        for &(name, slot, image_url) in DEFAULT_ITEMS {
            sqlx::query(
                "INSERT INTO items (name, type, price, image_url, is_default) VALUES (?, ?, 0, ?, 1)",
            )
            .bind(name)
            .bind(slot)
            .bind(image_url)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!(count = DEFAULT_ITEMS.len(), "seeded default item catalog");
        Ok(DEFAULT_ITEMS.len())
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<DbUser>, PortalError> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<DbUser>, PortalError> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<DbUser>, PortalError> {
        let users =
            sqlx::query_as::<_, DbUser>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }

    pub async fn list_items(&self) -> Result<Vec<Item>, PortalError> {
        let items =
            sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(items)
    }

    pub async fn get_item(&self, id: i64) -> Result<Option<Item>, PortalError> {
        fetch_item(&self.pool, id).await
    }

    pub async fn create_item(&self, new: NewItem) -> Result<Item, PortalError> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items (name, type, price, image_url, is_default)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(new.name)
        .bind(new.slot.as_str())
        .bind(new.price)
        .bind(new.image_url)
        .bind(new.is_default)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    /// Apply `patch` to the item.
    ///
    /// When the type changes, users who now hold two equipped items of the new
    /// type lose the retyped one, in the same transaction, so every inventory
    /// keeps at most one equipped item per slot.
    pub async fn update_item(&self, id: i64, patch: ItemPatch) -> Result<Item, PortalError> {
        let new_slot = patch.slot;
        let mut tx = self.pool.begin().await?;
        let item = sqlx::query_as::<_, Item>(&format!(
            "UPDATE items SET
                name = COALESCE(?, name),
                type = COALESCE(?, type),
                price = COALESCE(?, price),
                image_url = COALESCE(?, image_url),
                is_default = COALESCE(?, is_default)
             WHERE id = ?
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(patch.name)
        .bind(new_slot.map(SlotType::as_str))
        .bind(patch.price)
        .bind(patch.image_url)
        .bind(patch.is_default)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(PortalError::NotFound("item"))?;

        if let Some(slot) = new_slot {
            let unequipped = sqlx::query(
                "UPDATE inventory SET equipped = 0
                 WHERE item_id = ? AND equipped = 1 AND user_id IN (
                     SELECT inv.user_id FROM inventory inv JOIN items i ON i.id = inv.item_id
                     WHERE inv.equipped = 1 AND i.type = ? AND inv.item_id <> ?
                 )",
            )
            .bind(id)
            .bind(slot.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if unequipped > 0 {
                info!(
                    item_id = id,
                    %slot,
                    unequipped,
                    "retyped item unequipped where the slot was taken"
                );
            }
        }
        tx.commit().await?;
        Ok(item)
    }

    /// Grant or revoke the admin flag. Returns the updated user.
    pub async fn set_admin(&self, user_id: i64, is_admin: bool) -> Result<DbUser, PortalError> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            "UPDATE users SET is_admin = ? WHERE id = ? RETURNING {USER_COLUMNS}"
        ))
        .bind(is_admin)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or(PortalError::NotFound("user"))
    }

    /// Every item the user owns, with its equip flag, ordered by item id.
    pub async fn list_inventory(&self, user_id: i64) -> Result<Vec<InventoryItem>, PortalError> {
        let rows = sqlx::query_as::<_, InventoryItem>(
            "SELECT i.id, i.name, i.type, i.price, i.image_url, i.is_default, inv.equipped
             FROM inventory inv JOIN items i ON i.id = inv.item_id
             WHERE inv.user_id = ?
             ORDER BY i.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_equipped(&self, user_id: i64) -> Result<Vec<Item>, PortalError> {
        fetch_equipped(&self.pool, user_id).await
    }

    /// Raw JSON of the saved avatar snapshot, if one was ever saved.
    pub async fn load_avatar_snapshot(&self, user_id: i64) -> Result<Option<String>, PortalError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT equipped_items FROM avatar_storage WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn list_messages(&self, user_id: i64) -> Result<Vec<Message>, PortalError> {
        let rows = sqlx::query_as::<_, Message>(
            "SELECT id, text, coins, is_read, created_at FROM messages
             WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Mark one of the user's messages read. Messages of other users count as missing.
    pub async fn mark_message_read(&self, user_id: i64, message_id: i64) -> Result<(), PortalError> {
        let res = sqlx::query("UPDATE messages SET is_read = 1 WHERE id = ? AND user_id = ?")
            .bind(message_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(PortalError::NotFound("message"));
        }
        Ok(())
    }
}

/// Take the SQLite write lock and assert the user exists.
///
/// Must be the first statement of a mutating transaction: it makes the
/// transaction a writer before any precondition is read, so two transactions
/// touching the same user never interleave their checks and writes.
pub(crate) async fn lock_user<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
) -> Result<(), PortalError> {
    let res = sqlx::query("UPDATE users SET coins = coins WHERE id = ?")
        .bind(user_id)
        .execute(executor)
        .await?;
    if res.rows_affected() == 0 {
        return Err(PortalError::NotFound("user"));
    }
    Ok(())
}

pub(crate) async fn fetch_item<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<Item>, PortalError> {
    let item = sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(item)
}

pub(crate) async fn fetch_coins<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
) -> Result<i64, PortalError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT coins FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
    row.map(|r| r.0).ok_or(PortalError::NotFound("user"))
}

/// The user's equipped items, ordered by item id.
pub(crate) async fn fetch_equipped<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
) -> Result<Vec<Item>, PortalError> {
    let items = sqlx::query_as::<_, Item>(
        "SELECT i.id, i.name, i.type, i.price, i.image_url, i.is_default
         FROM inventory inv JOIN items i ON i.id = inv.item_id
         WHERE inv.user_id = ? AND inv.equipped = 1
         ORDER BY i.id",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(items)
}

/// Grant `item_id` to the user, unequipped.
pub(crate) async fn insert_inventory<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    item_id: i64,
) -> Result<(), PortalError> {
    sqlx::query(
        "INSERT INTO inventory (user_id, item_id, equipped, acquired_at) VALUES (?, ?, 0, ?)",
    )
    .bind(user_id)
    .bind(item_id)
    .bind(Utc::now())
    .execute(executor)
    .await
    .map_err(|e| PortalError::on_unique_violation(e, PortalError::AlreadyOwned))?;
    Ok(())
}

/// Add `amount` (may be zero) to the balance and return the new balance.
pub(crate) async fn credit_coins<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
    amount: i64,
) -> Result<i64, PortalError> {
    let row: Option<(i64,)> =
        sqlx::query_as("UPDATE users SET coins = coins + ? WHERE id = ? RETURNING coins")
            .bind(amount)
            .bind(user_id)
            .fetch_optional(executor)
            .await?;
    row.map(|r| r.0).ok_or(PortalError::NotFound("user"))
}
