use crate::config::Config;
use crate::db::sqlite::PortalStorage;
use crate::db::DbUser;
use crate::error::PortalError;
use crate::service::auth::{TokenService, hash_password, verify_password};
use chrono::Utc;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_EMAIL_LENGTH: usize = 254;
/// Login attempts between two sweeps of idle rate limiter keys.
const LIMITER_PRUNE_EVERY: u64 = 256;

/// A successful login or registration.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub token: String,
}

/// Registration and login.
#[derive(Clone)]
pub struct AccountOps {
    storage: PortalStorage,
    tokens: TokenService,
    starting_coins: i64,
    admin_emails: Arc<[String]>,
    login_limiter: Arc<DefaultKeyedRateLimiter<String>>,
    login_attempts: Arc<AtomicU64>,
}

impl AccountOps {
    pub fn new(storage: PortalStorage, tokens: TokenService, cfg: &Config) -> Self {
        let per_minute = NonZeroU32::new(cfg.login_attempts_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            storage,
            tokens,
            starting_coins: cfg.starting_coins,
            admin_emails: cfg.admin_emails.iter().map(|e| normalize_email(e)).collect(),
            login_limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
            login_attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create the account and grant every default item (unequipped) in one transaction.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Session, PortalError> {
        let email = normalize_email(email);
        let username = username.trim();
        validate_registration(&email, password, username)?;

        let password_hash = hash_password(password)?;
        let is_admin = self.admin_emails.contains(&email);

        let mut tx = self.storage.pool().begin().await?;
        let (user_id,): (i64,) = sqlx::query_as(
            "INSERT INTO users (email, password_hash, username, is_admin, coins, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&email)
        .bind(password_hash)
        .bind(username)
        .bind(is_admin)
        .bind(self.starting_coins)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| PortalError::on_unique_violation(e, PortalError::EmailTaken))?;

        let granted = sqlx::query(
            "INSERT INTO inventory (user_id, item_id, equipped, acquired_at)
             SELECT ?, id, 0, ? FROM items WHERE is_default = 1",
        )
        .bind(user_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        tx.commit().await?;

        info!(user_id, is_admin, default_items = granted, "user registered");
        let token = self.tokens.issue(user_id, &email)?;
        Ok(Session {
            user_id,
            username: username.to_string(),
            token,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, PortalError> {
        let email = normalize_email(email);
        self.admit_login(&email)?;

        let user: DbUser = self
            .storage
            .get_user_by_email(&email)
            .await?
            .ok_or(PortalError::InvalidCredentials)?;
        verify_password(password, &user.password_hash)?;

        info!(user_id = user.id, "user logged in");
        let token = self.tokens.issue(user.id, &user.email)?;
        Ok(Session {
            user_id: user.id,
            username: user.username,
            token,
        })
    }
}

impl AccountOps {
    /// Count the attempt against the per-email quota.
    ///
    /// Over-long emails cannot belong to an account and never get a limiter key.
    /// Keys whose quota has fully recovered are swept every
    /// `LIMITER_PRUNE_EVERY` attempts.
    fn admit_login(&self, email: &str) -> Result<(), PortalError> {
        if email.len() > MAX_EMAIL_LENGTH {
            return Err(PortalError::InvalidCredentials);
        }
        if self.login_attempts.fetch_add(1, Ordering::Relaxed) % LIMITER_PRUNE_EVERY
            == LIMITER_PRUNE_EVERY - 1
        {
            self.prune_login_limiter();
        }
        if self.login_limiter.check_key(&email.to_string()).is_err() {
            warn!(email = %email, "login rate limit exceeded");
            return Err(PortalError::TooManyRequests);
        }
        Ok(())
    }

    fn prune_login_limiter(&self) {
        self.login_limiter.retain_recent();
        self.login_limiter.shrink_to_fit();
        debug!(keys = self.login_limiter.len(), "login rate limiter pruned");
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_registration(email: &str, password: &str, username: &str) -> Result<(), PortalError> {
    if email.is_empty() || !email.contains('@') {
        return Err(PortalError::Validation("a valid email is required".to_string()));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(PortalError::Validation(format!(
            "email must be at most {MAX_EMAIL_LENGTH} characters"
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PortalError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if username.is_empty() {
        return Err(PortalError::Validation("username is required".to_string()));
    }
    Ok(())
}
