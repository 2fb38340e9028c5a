//! Binding between entity types and their remote tables

use super::tables;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{
    Customer, DeliveryRate, DiningTable, Expense, InventoryItem, MenuItem, Role, Site, User, Zone,
};
use shared::order::{Order, Sale};

/// 存储在 `{ id, data }` 行中的实体
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const TABLE: &'static str;

    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($($ty:ty => $table:expr),* $(,)?) => {
        $(
            impl Record for $ty {
                const TABLE: &'static str = $table;

                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_record! {
    User => tables::USERS,
    Role => tables::ROLES,
    MenuItem => tables::MENU_ITEMS,
    DiningTable => tables::TABLES,
    Zone => tables::ZONES,
    InventoryItem => tables::INVENTORY,
    Order => tables::ORDERS,
    Sale => tables::SALES,
    Customer => tables::CUSTOMERS,
    Expense => tables::EXPENSES,
    DeliveryRate => tables::DELIVERY_RATES,
    Site => tables::SEDES,
}
