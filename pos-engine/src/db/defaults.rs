//! Built-in defaults used when the mirror has never seen a table

use serde_json::{Value, json};
use shared::models::{Capability, Settings};

use super::tables;

pub const ADMIN_ROLE_ID: &str = "role-admin";
pub const CASHIER_ROLE_ID: &str = "role-cajero";
pub const WAITER_ROLE_ID: &str = "role-mesero";
pub const DEFAULT_SITE_ID: &str = "sede-principal";

fn role(id: &str, name: &str, capabilities: &[Capability]) -> Value {
    let permissions: Vec<&str> = capabilities.iter().map(Capability::as_str).collect();
    json!({ "id": id, "name": name, "permissions": permissions })
}

fn default_roles() -> Vec<Value> {
    vec![
        role(ADMIN_ROLE_ID, "Administrador", &Capability::ALL),
        role(
            CASHIER_ROLE_ID,
            "Cajero",
            &[
                Capability::Pos,
                Capability::Tables,
                Capability::Delivery,
                Capability::Customers,
                Capability::Kitchen,
            ],
        ),
        role(
            WAITER_ROLE_ID,
            "Mesero",
            &[Capability::Pos, Capability::Tables, Capability::Kitchen],
        ),
    ]
}

fn default_sites() -> Vec<Value> {
    vec![json!({ "id": DEFAULT_SITE_ID, "name": "Sede Principal", "address": "" })]
}

fn default_menu_items() -> Vec<Value> {
    vec![
        json!({
            "id": "menu-hamburguesa-clasica",
            "name": "Hamburguesa Clásica",
            "category": "Hamburguesas",
            "price": 18000,
            "hasFries": true
        }),
        json!({
            "id": "menu-alitas-bbq",
            "name": "Alitas x8",
            "category": "Alitas",
            "price": 22000,
            "hasWings": true,
            "hasFries": true
        }),
        json!({
            "id": "menu-combo-perro",
            "name": "Combo Perro Caliente",
            "category": "Perros",
            "price": 16000,
            "submenuKey": "bebida"
        }),
        json!({
            "id": "menu-gelato",
            "name": "Copa de Helado",
            "category": "Postres",
            "price": 9000,
            "maxChoices": 3
        }),
        json!({
            "id": "menu-gaseosa",
            "name": "Gaseosa",
            "category": "Bebidas",
            "price": 4000
        }),
    ]
}

/// 表的内置默认数据；没有默认值的表返回空列表
///
/// users 默认为空：首个管理员通过引导流程创建。
pub fn default_rows(table: &str) -> Vec<Value> {
    match table {
        tables::ROLES => default_roles(),
        tables::SEDES => default_sites(),
        tables::MENU_ITEMS => default_menu_items(),
        _ => Vec::new(),
    }
}

/// 配置项的内置默认值
pub fn default_setting(key: &str) -> Option<Value> {
    Settings::default().value_of(key)
}
