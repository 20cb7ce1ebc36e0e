use crate::db::sqlite::{PortalStorage, credit_coins, lock_user};
use crate::error::PortalError;
use chrono::Utc;
use tracing::info;

/// Who receives an admin reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardTarget {
    User(i64),
    AllUsers,
}

/// Coin grants: one-shot game rewards and admin rewards delivered with an inbox message.
#[derive(Clone)]
pub struct RewardOps {
    storage: PortalStorage,
    max_game_reward: i64,
    max_admin_reward: i64,
}

impl RewardOps {
    pub fn new(storage: PortalStorage, max_game_reward: i64, max_admin_reward: i64) -> Self {
        Self {
            storage,
            max_game_reward,
            max_admin_reward,
        }
    }

    /// Pay `coins` for `reward_key` unless the user already claimed that key.
    /// Returns the new balance.
    pub async fn claim_game_reward(
        &self,
        user_id: i64,
        reward_key: &str,
        coins: i64,
    ) -> Result<i64, PortalError> {
        let reward_key = reward_key.trim();
        if reward_key.is_empty() {
            return Err(PortalError::Validation("rewardKey is required".to_string()));
        }
        if !(1..=self.max_game_reward).contains(&coins) {
            return Err(PortalError::Validation(format!(
                "coins must be between 1 and {}",
                self.max_game_reward
            )));
        }

        let mut tx = self.storage.pool().begin().await?;
        lock_user(&mut *tx, user_id).await?;

        sqlx::query(
            "INSERT INTO achievements (user_id, reward_key, coins, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(reward_key)
        .bind(coins)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| PortalError::on_unique_violation(e, PortalError::RewardClaimed))?;

        let new_balance = credit_coins(&mut *tx, user_id, coins).await?;
        tx.commit().await?;

        info!(user_id, reward_key, coins, new_balance, "game reward claimed");
        Ok(new_balance)
    }

    /// Credit coins and drop an inbox message for each recipient, atomically.
    /// Returns the number of recipients.
    pub async fn send_admin_reward(
        &self,
        target: RewardTarget,
        text: &str,
        coins: i64,
    ) -> Result<u64, PortalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PortalError::Validation("text is required".to_string()));
        }
        if !(0..=self.max_admin_reward).contains(&coins) {
            return Err(PortalError::Validation(format!(
                "coins must be between 0 and {}",
                self.max_admin_reward
            )));
        }

        let mut tx = self.storage.pool().begin().await?;
        let now = Utc::now();
        let recipients = match target {
            RewardTarget::User(user_id) => {
                credit_coins(&mut *tx, user_id, coins).await?;
                sqlx::query(
                    "INSERT INTO messages (user_id, text, coins, is_read, created_at)
                     VALUES (?, ?, ?, 0, ?)",
                )
                .bind(user_id)
                .bind(text)
                .bind(coins)
                .bind(now)
                .execute(&mut *tx)
                .await?
                .rows_affected()
            }
            RewardTarget::AllUsers => {
                sqlx::query("UPDATE users SET coins = coins + ?")
                    .bind(coins)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query(
                    "INSERT INTO messages (user_id, text, coins, is_read, created_at)
                     SELECT id, ?, ?, 0, ? FROM users",
                )
                .bind(text)
                .bind(coins)
                .bind(now)
                .execute(&mut *tx)
                .await?
                .rows_affected()
            }
        };
        tx.commit().await?;

        info!(?target, coins, recipients, "admin reward sent");
        Ok(recipients)
    }
}
