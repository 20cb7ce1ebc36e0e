//! Purchase, equip and avatar snapshot transactions.
//!
//! Every mutation here runs inside a single SQLite transaction that opens with
//! [`lock_user`], so concurrent requests for the same user are serialized on
//! the database write lock. Any early return drops the transaction, which
//! rolls back everything written so far.
//!
//! The one-equipped-item-per-slot rule is enforced only in [`InventoryOps::equip`].

use crate::db::models::{Item, SlotType};
use crate::db::sqlite::{
    PortalStorage, fetch_coins, fetch_equipped, fetch_item, insert_inventory, lock_user,
};
use crate::error::PortalError;
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, info};

#[derive(Clone)]
pub struct InventoryOps {
    storage: PortalStorage,
}

impl InventoryOps {
    pub fn new(storage: PortalStorage) -> Self {
        Self { storage }
    }

    /// Buy `item_id` for the user. Returns the balance after the debit.
    pub async fn purchase(&self, user_id: i64, item_id: i64) -> Result<i64, PortalError> {
        let mut tx = self.storage.pool().begin().await?;
        lock_user(&mut *tx, user_id).await?;

        let item = fetch_item(&mut *tx, item_id)
            .await?
            .ok_or(PortalError::NotFound("item"))?;
        if owns_item(&mut tx, user_id, item_id).await? {
            return Err(PortalError::AlreadyOwned);
        }
        let balance = fetch_coins(&mut *tx, user_id).await?;
        if balance < item.price {
            return Err(PortalError::InsufficientFunds {
                balance,
                price: item.price,
            });
        }

        // the balance guard in WHERE keeps the debit safe even without the user lock
        let debited: Option<(i64,)> = sqlx::query_as(
            "UPDATE users SET coins = coins - ? WHERE id = ? AND coins >= ? RETURNING coins",
        )
        .bind(item.price)
        .bind(user_id)
        .bind(item.price)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((new_balance,)) = debited else {
            return Err(PortalError::InsufficientFunds {
                balance,
                price: item.price,
            });
        };
        insert_inventory(&mut *tx, user_id, item_id).await?;
        tx.commit().await?;

        info!(
            user_id,
            item_id,
            price = item.price,
            new_balance,
            "item purchased"
        );
        Ok(new_balance)
    }

    /// Equip an owned item, unequipping whatever else the user wears in that slot.
    /// Returns every item the user has equipped afterwards.
    pub async fn equip(
        &self,
        user_id: i64,
        item_id: i64,
        claimed_slot: SlotType,
    ) -> Result<Vec<Item>, PortalError> {
        let mut tx = self.storage.pool().begin().await?;
        lock_user(&mut *tx, user_id).await?;

        let item = fetch_item(&mut *tx, item_id)
            .await?
            .ok_or(PortalError::NotFound("item"))?;
        if item.slot != claimed_slot {
            return Err(PortalError::Validation(format!(
                "item {item_id} is of type `{}`, not `{claimed_slot}`",
                item.slot
            )));
        }
        if !owns_item(&mut tx, user_id, item_id).await? {
            return Err(PortalError::NotOwned);
        }

        let unequipped = sqlx::query(
            "UPDATE inventory SET equipped = 0
             WHERE user_id = ? AND equipped = 1
               AND item_id IN (SELECT id FROM items WHERE type = ?)",
        )
        .bind(user_id)
        .bind(item.slot.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("UPDATE inventory SET equipped = 1 WHERE user_id = ? AND item_id = ?")
            .bind(user_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        let equipped = fetch_equipped(&mut *tx, user_id).await?;
        tx.commit().await?;

        debug!(user_id, item_id, slot = %item.slot, unequipped, "item equipped");
        Ok(equipped)
    }

    /// Snapshot the live equipped items into `avatar_storage` and return them.
    pub async fn save_state(&self, user_id: i64) -> Result<Vec<Item>, PortalError> {
        let mut tx = self.storage.pool().begin().await?;
        lock_user(&mut *tx, user_id).await?;

        let equipped = fetch_equipped(&mut *tx, user_id).await?;
        let snapshot = serde_json::to_string(&equipped)?;

        sqlx::query(
            "INSERT INTO avatar_storage (user_id, equipped_items, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                equipped_items = excluded.equipped_items,
                updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(snapshot)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(user_id, items = equipped.len(), "avatar state saved");
        Ok(equipped)
    }

    /// The last saved snapshot; empty when the user never saved.
    pub async fn load_state(&self, user_id: i64) -> Result<Vec<Item>, PortalError> {
        match self.storage.load_avatar_snapshot(user_id).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }
}

async fn owns_item(
    conn: &mut SqliteConnection,
    user_id: i64,
    item_id: i64,
) -> Result<bool, PortalError> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM inventory WHERE user_id = ? AND item_id = ?")
            .bind(user_id)
            .bind(item_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}
