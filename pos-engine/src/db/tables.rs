//! Remote table names

pub const USERS: &str = "users";
pub const ROLES: &str = "roles";
pub const MENU_ITEMS: &str = "menu_items";
pub const TABLES: &str = "tables";
pub const ZONES: &str = "zones";
pub const INVENTORY: &str = "inventory";
pub const ORDERS: &str = "orders";
pub const SALES: &str = "sales";
pub const CUSTOMERS: &str = "customers";
pub const EXPENSES: &str = "expenses";
pub const DELIVERY_RATES: &str = "delivery_rates";
pub const SEDES: &str = "sedes";
pub const SETTINGS: &str = "settings";

/// 全量拉取覆盖的实体表 (不含 settings)
pub const ENTITY_TABLES: [&str; 12] = [
    USERS,
    ROLES,
    MENU_ITEMS,
    TABLES,
    ZONES,
    INVENTORY,
    ORDERS,
    SALES,
    CUSTOMERS,
    EXPENSES,
    DELIVERY_RATES,
    SEDES,
];
