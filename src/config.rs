use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Runtime configuration.
///
/// Sources, later ones win:
/// - built-in defaults
/// - `config.toml` in the working directory (optional)
/// - environment variables prefixed with `PORTAL_`, e.g. `PORTAL_JWT_SECRET`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub starting_coins: i64,
    pub max_game_reward: i64,
    /// Upper bound on the coins of a single admin reward.
    pub max_admin_reward: i64,
    pub login_attempts_per_minute: u32,
    /// Accounts registered with one of these emails become admins.
    pub admin_emails: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            database_url: "sqlite:portal.db".to_string(),
            loglevel: "info".to_string(),
            jwt_secret: "change-me".to_string(),
            token_ttl_hours: 24,
            starting_coins: 100,
            max_game_reward: 100,
            max_admin_reward: 1_000_000,
            login_attempts_per_minute: 10,
            admin_emails: Vec::new(),
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("PORTAL_"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::load().unwrap_or_else(|e| panic!("invalid configuration: {e}"))
});
