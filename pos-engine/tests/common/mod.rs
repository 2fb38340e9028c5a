#![allow(dead_code)]

use pos_engine::admin::UserInput;
use pos_engine::db::tables;
use pos_engine::{Config, LocalMirror, MemoryRemoteStore, PosEngine, RemoteStore};
use serde_json::json;
use shared::Notice;
use std::sync::Arc;
use tokio::sync::broadcast;

pub const SITE: &str = "sede-principal";
pub const TABLE_ID: &str = "mesa-5";
pub const ZONE_ID: &str = "zone-salon";

pub fn config() -> Config {
    Config::offline("/tmp/pos-engine-it")
}

/// 远端为内存实现的引擎，带一个区域、一张桌台和测试菜单
pub async fn online_engine() -> (PosEngine, Arc<MemoryRemoteStore>) {
    let remote = Arc::new(MemoryRemoteStore::new());
    let engine = PosEngine::with_parts(
        config(),
        Some(remote.clone() as Arc<dyn RemoteStore>),
        LocalMirror::open_in_memory().unwrap(),
    );
    engine.seed_remote_defaults().await;

    remote.put(tables::ZONES, ZONE_ID, json!({ "id": ZONE_ID, "name": "Salón", "sedeId": SITE }));
    remote.put(
        tables::TABLES,
        TABLE_ID,
        json!({
            "id": TABLE_ID, "name": "Mesa 5", "capacity": 4,
            "zoneId": ZONE_ID, "sedeId": SITE, "status": "available"
        }),
    );
    remote.put(
        tables::MENU_ITEMS,
        "menu-loca",
        json!({ "id": "menu-loca", "name": "Hamburguesa Loca", "category": "Hamburguesas", "price": 15000 }),
    );
    remote.put(
        tables::MENU_ITEMS,
        "menu-alitas-6",
        json!({
            "id": "menu-alitas-6", "name": "Alitas x6", "category": "Alitas", "price": 12000,
            "recipe": [{ "inventoryItemId": "inv-1", "quantity": 2 }]
        }),
    );
    remote.put(
        tables::MENU_ITEMS,
        "menu-banquete",
        json!({ "id": "menu-banquete", "name": "Banquete", "category": "Combos", "price": 50000 }),
    );
    remote.put(
        tables::INVENTORY,
        "inv-1",
        json!({
            "id": "inv-1", "name": "Alitas", "stock": 10, "unit": "kg",
            "cost": 900, "alertThreshold": 2, "sedeId": SITE
        }),
    );

    engine.refresh().await;
    login_admin(&engine).await;
    (engine, remote)
}

/// 首次引导：创建管理员并登录
pub async fn login_admin(engine: &PosEngine) {
    engine
        .save_user(UserInput {
            username: "admin".into(),
            name: "Administrador".into(),
            password: Some("admin123".into()),
            role_id: "role-admin".into(),
            site_id: SITE.into(),
            ..Default::default()
        })
        .await
        .unwrap();
    engine.login("admin", "admin123").unwrap();
}

pub fn menu_item(engine: &PosEngine, id: &str) -> shared::models::MenuItem {
    engine.state().read().menu_item(id).cloned().unwrap()
}

pub fn drain(rx: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}
