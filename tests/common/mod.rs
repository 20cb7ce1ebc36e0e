#![allow(dead_code)]

use avatar_portal::config::Config;
use avatar_portal::db::{Item, NewItem, PortalStorage, SlotType};
use avatar_portal::router::{PortalState, portal_router};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::{
    fs,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@portal.test";

static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Router plus direct storage access, backed by a throwaway SQLite file.
pub struct TestApp {
    pub app: Router,
    pub state: PortalState,
    path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}

pub fn test_config() -> Config {
    Config {
        jwt_secret: "test-secret".to_string(),
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        ..Config::default()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(cfg: Config) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!(
        "avatar-portal-test-{}-{}-{}.sqlite",
        std::process::id(),
        nanos,
        DB_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let storage = PortalStorage::connect(&format!("sqlite:{}", path.display()))
        .await
        .expect("failed to open test database");
    let state = PortalState::new(storage, &cfg);
    let app = portal_router(state.clone());
    TestApp { app, state, path }
}

impl TestApp {
    pub fn storage(&self) -> &PortalStorage {
        &self.state.storage
    }

    /// Send a request and decode the JSON response body (`Value::Null` when empty).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };

        let resp = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("failed to build request"))
            .await
            .expect("request failed");
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(token), Some(body)).await
    }

    /// Register `email` with a fixed password and return its token.
    pub async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": "password123",
                    "username": email.split('@').next().unwrap_or("user"),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["token"].as_str().expect("token missing").to_string()
    }

    pub async fn user_id(&self, email: &str) -> i64 {
        self.storage()
            .get_user_by_email(email)
            .await
            .expect("query failed")
            .expect("user missing")
            .id
    }

    pub async fn coins(&self, token: &str) -> i64 {
        let (status, me) = self.get("/api/user/me", token).await;
        assert_eq!(status, StatusCode::OK);
        me["coins"].as_i64().expect("coins missing")
    }

    pub async fn create_item(&self, name: &str, slot: SlotType, price: i64) -> Item {
        self.storage()
            .create_item(NewItem {
                name: name.to_string(),
                slot,
                price,
                image_url: format!("/assets/{name}.png"),
                is_default: false,
            })
            .await
            .expect("failed to create item")
    }

    /// Item ids in an `equippedItems`/`state` style array.
    pub fn ids(items: &Value) -> Vec<i64> {
        items
            .as_array()
            .expect("expected an array")
            .iter()
            .map(|i| i["id"].as_i64().expect("id missing"))
            .collect()
    }
}
