mod common;

use avatar_portal::db::SlotType;
use axum::http::StatusCode;
use common::{TestApp, spawn_app};
use serde_json::{Value, json};

async fn buy(t: &TestApp, token: &str, item_id: i64) {
    let (status, body) = t
        .post("/api/shop/buy", token, json!({ "itemId": item_id }))
        .await;
    assert_eq!(status, StatusCode::OK, "buy failed: {body}");
}

async fn equip(t: &TestApp, token: &str, item_id: i64, item_type: &str) -> (StatusCode, Value) {
    t.post(
        "/api/avatar/equip",
        token,
        json!({ "itemId": item_id, "itemType": item_type }),
    )
    .await
}

/// Ids of the inventory rows of `slot` that are currently equipped.
async fn equipped_in_slot(t: &TestApp, token: &str, slot: &str) -> Vec<i64> {
    let (_, inventory) = t.get("/api/user/inventory", token).await;
    inventory
        .as_array()
        .unwrap()
        .iter()
        .filter(|i| i["type"] == slot && i["equipped"] == true)
        .map(|i| i["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn equipping_a_second_hair_replaces_the_first() {
    let t = spawn_app().await;
    let token = t.register("stylist@portal.test").await;
    let a = t.create_item("bob", SlotType::Hair, 10).await;
    let b = t.create_item("mohawk", SlotType::Hair, 10).await;
    buy(&t, &token, a.id).await;
    buy(&t, &token, b.id).await;

    let (status, body) = equip(&t, &token, a.id, "hair").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(TestApp::ids(&body["equippedItems"]), vec![a.id]);

    let (status, body) = equip(&t, &token, b.id, "hair").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(TestApp::ids(&body["equippedItems"]), vec![b.id]);
    assert_eq!(equipped_in_slot(&t, &token, "hair").await, vec![b.id]);
}

#[tokio::test]
async fn every_equip_leaves_exactly_one_item_per_slot() {
    let t = spawn_app().await;
    let token = t.register("wardrobe@portal.test").await;

    let mut tops = Vec::new();
    for n in 0..3 {
        let item = t.create_item(&format!("top-{n}"), SlotType::Top, 5).await;
        buy(&t, &token, item.id).await;
        tops.push(item.id);
    }
    let face = t.create_item("grin", SlotType::Face, 5).await;
    buy(&t, &token, face.id).await;
    let (status, _) = equip(&t, &token, face.id, "face").await;
    assert_eq!(status, StatusCode::OK);

    // owned tops now include the default T-shirt as well
    for &id in [tops[0], tops[2], tops[1], tops[1], tops[0]].iter() {
        let (status, body) = equip(&t, &token, id, "top").await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(equipped_in_slot(&t, &token, "top").await, vec![id]);
        // other slots are left alone
        assert_eq!(equipped_in_slot(&t, &token, "face").await, vec![face.id]);
    }
}

#[tokio::test]
async fn equip_rejects_a_wrong_item_type() {
    let t = spawn_app().await;
    let token = t.register("mixup@portal.test").await;
    let boots = t.create_item("boots", SlotType::Bottom, 5).await;
    buy(&t, &token, boots.id).await;

    let (status, body) = equip(&t, &token, boots.id, "hair").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION");
    assert!(equipped_in_slot(&t, &token, "bottom").await.is_empty());
}

#[tokio::test]
async fn equip_rejects_an_unknown_slot_name() {
    let t = spawn_app().await;
    let token = t.register("hat@portal.test").await;

    let (status, body) = equip(&t, &token, 1, "hat").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION");
}

#[tokio::test]
async fn equip_requires_ownership() {
    let t = spawn_app().await;
    let token = t.register("window@portal.test").await;
    let cape = t.create_item("cape", SlotType::Accessory, 50).await;

    let (status, body) = equip(&t, &token, cape.id, "accessory").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "NOT_OWNED");

    let (status, _) = equip(&t, &token, 9999, "accessory").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_equip_keeps_the_current_item() {
    let t = spawn_app().await;
    let token = t.register("keep@portal.test").await;
    let a = t.create_item("braid", SlotType::Hair, 10).await;
    let b = t.create_item("bun", SlotType::Hair, 10).await;
    buy(&t, &token, a.id).await;
    let (status, _) = equip(&t, &token, a.id, "hair").await;
    assert_eq!(status, StatusCode::OK);

    // b is not owned: nothing may be unequipped
    let (status, _) = equip(&t, &token, b.id, "hair").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(equipped_in_slot(&t, &token, "hair").await, vec![a.id]);
}

#[tokio::test]
async fn save_state_then_load_state_returns_the_equipped_items() {
    let t = spawn_app().await;
    let token = t.register("snap@portal.test").await;
    let a = t.create_item("afro", SlotType::Hair, 10).await;
    let b = t.create_item("scarf", SlotType::Accessory, 10).await;
    buy(&t, &token, a.id).await;
    buy(&t, &token, b.id).await;
    equip(&t, &token, a.id, "hair").await;
    equip(&t, &token, b.id, "accessory").await;

    let (status, saved) = t.post("/api/avatar/save-state", &token, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{saved}");
    assert_eq!(saved["success"], true);
    assert_eq!(TestApp::ids(&saved["state"]), vec![a.id, b.id]);

    let (status, loaded) = t.get("/api/avatar/load-state", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(TestApp::ids(&loaded["equippedItems"]), vec![a.id, b.id]);
    assert_eq!(loaded["equippedItems"][0]["name"], "afro");
    assert_eq!(loaded["equippedItems"][0]["type"], "hair");
}

#[tokio::test]
async fn load_state_is_empty_before_any_save() {
    let t = spawn_app().await;
    let token = t.register("fresh@portal.test").await;

    let (status, loaded) = t.get("/api/avatar/load-state", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["equippedItems"], json!([]));
}

#[tokio::test]
async fn snapshot_is_decoupled_from_live_equip_state() {
    let t = spawn_app().await;
    let token = t.register("drift@portal.test").await;
    let a = t.create_item("curls", SlotType::Hair, 10).await;
    let b = t.create_item("spikes", SlotType::Hair, 10).await;
    buy(&t, &token, a.id).await;
    buy(&t, &token, b.id).await;
    equip(&t, &token, a.id, "hair").await;
    t.post("/api/avatar/save-state", &token, json!({})).await;

    equip(&t, &token, b.id, "hair").await;

    let (_, loaded) = t.get("/api/avatar/load-state", &token).await;
    assert_eq!(TestApp::ids(&loaded["equippedItems"]), vec![a.id]);
    let (_, live) = t.get("/api/avatar", &token).await;
    assert_eq!(TestApp::ids(&live["equippedItems"]), vec![b.id]);

    // saving again overwrites the single snapshot row
    t.post("/api/avatar/save-state", &token, json!({})).await;
    let (_, loaded) = t.get("/api/avatar/load-state", &token).await;
    assert_eq!(TestApp::ids(&loaded["equippedItems"]), vec![b.id]);
}

#[tokio::test]
async fn concurrent_equips_in_one_slot_leave_a_single_item() {
    let t = spawn_app().await;
    t.register("race@portal.test").await;
    let user_id = t.user_id("race@portal.test").await;

    let mut ids = Vec::new();
    for n in 0..3 {
        let item = t.create_item(&format!("wig-{n}"), SlotType::Hair, 0).await;
        t.state.inventory.purchase(user_id, item.id).await.unwrap();
        ids.push(item.id);
    }

    let handles: Vec<_> = ids
        .iter()
        .cycle()
        .take(12)
        .map(|&item_id| {
            let ops = t.state.inventory.clone();
            tokio::spawn(async move { ops.equip(user_id, item_id, SlotType::Hair).await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("equip failed");
    }

    let equipped_hair = t
        .storage()
        .list_inventory(user_id)
        .await
        .unwrap()
        .into_iter()
        .filter(|i| i.item.slot == SlotType::Hair && i.equipped)
        .count();
    assert_eq!(equipped_hair, 1);
}
