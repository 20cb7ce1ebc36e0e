use crate::error::PortalError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;

/// Cosmetic slot an item occupies. Every slot holds at most one equipped item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotType {
    Hair,
    Top,
    Bottom,
    Accessory,
    Face,
}

impl SlotType {
    pub const ALL: [SlotType; 5] = [
        SlotType::Hair,
        SlotType::Top,
        SlotType::Bottom,
        SlotType::Accessory,
        SlotType::Face,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SlotType::Hair => "hair",
            SlotType::Top => "top",
            SlotType::Bottom => "bottom",
            SlotType::Accessory => "accessory",
            SlotType::Face => "face",
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotType {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SlotType::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| PortalError::Validation(format!("unknown item type `{s}`")))
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbUser {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub username: String,
    pub is_admin: bool,
    pub coins: i64,
    pub created_at: DateTime<Utc>,
}

/// What the API shows of a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub coins: i64,
    pub is_admin: bool,
}

impl From<DbUser> for UserProfile {
    fn from(u: DbUser) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            coins: u.coins,
            is_admin: u.is_admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub slot: SlotType,
    pub price: i64,
    pub image_url: String,
    pub is_default: bool,
}

impl<'r> FromRow<'r, SqliteRow> for Item {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let slot: String = row.try_get("type")?;
        let slot = slot
            .parse::<SlotType>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Item {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slot,
            price: row.try_get("price")?,
            image_url: row.try_get("image_url")?,
            is_default: row.try_get("is_default")?,
        })
    }
}

/// An owned item together with its equip flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    #[serde(flatten)]
    pub item: Item,
    pub equipped: bool,
}

impl<'r> FromRow<'r, SqliteRow> for InventoryItem {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(InventoryItem {
            item: Item::from_row(row)?,
            equipped: row.try_get("equipped")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub coins: i64,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_type_parses_every_variant() {
        for slot in SlotType::ALL {
            assert_eq!(slot.as_str().parse::<SlotType>().unwrap(), slot);
        }
        assert!("hat".parse::<SlotType>().is_err());
        assert!("Hair".parse::<SlotType>().is_err());
    }

    #[test]
    fn item_serializes_with_wire_names() {
        let item = Item {
            id: 7,
            name: "Mohawk".to_string(),
            slot: SlotType::Hair,
            price: 30,
            image_url: "/assets/hair/mohawk.png".to_string(),
            is_default: false,
        };
        let v = serde_json::to_value(InventoryItem {
            item,
            equipped: true,
        })
        .unwrap();
        assert_eq!(v["type"], "hair");
        assert_eq!(v["imageUrl"], "/assets/hair/mohawk.png");
        assert_eq!(v["isDefault"], false);
        assert_eq!(v["equipped"], true);
    }
}
