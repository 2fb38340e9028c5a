//! Application state
//!
//! 单一的内存状态：所有实体集合、配置、当前门店上下文和登录会话。
//! 引擎和对账 worker 共享同一个 [`AppState`]；锁只在同步代码中持有，
//! 不跨越 `.await`。

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::{
    Customer, DeliveryRate, DiningTable, Expense, InventoryItem, MenuItem, Role, Settings, Site,
    SiteScope, User, Zone,
};
use shared::order::{Order, Sale};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::gateway::{DataSnapshot, decode_rows};
use crate::db::{Record, tables};

/// 所有实体集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub menu_items: Vec<MenuItem>,
    pub tables: Vec<DiningTable>,
    pub zones: Vec<Zone>,
    pub inventory: Vec<InventoryItem>,
    pub orders: Vec<Order>,
    pub sales: Vec<Sale>,
    pub customers: Vec<Customer>,
    pub expenses: Vec<Expense>,
    pub delivery_rates: Vec<DeliveryRate>,
    pub sites: Vec<Site>,
}

fn take<T: DeserializeOwned>(raw: &mut BTreeMap<&str, Vec<Value>>, table: &str) -> Vec<T> {
    decode_rows(raw.remove(table).unwrap_or_default())
}

impl Collections {
    /// 从按表名分组的原始 JSON 解码
    pub(crate) fn from_raw(mut raw: BTreeMap<&str, Vec<Value>>) -> Self {
        Self {
            users: take(&mut raw, tables::USERS),
            roles: take(&mut raw, tables::ROLES),
            menu_items: take(&mut raw, tables::MENU_ITEMS),
            tables: take(&mut raw, tables::TABLES),
            zones: take(&mut raw, tables::ZONES),
            inventory: take(&mut raw, tables::INVENTORY),
            orders: take(&mut raw, tables::ORDERS),
            sales: take(&mut raw, tables::SALES),
            customers: take(&mut raw, tables::CUSTOMERS),
            expenses: take(&mut raw, tables::EXPENSES),
            delivery_rates: take(&mut raw, tables::DELIVERY_RATES),
            sites: take(&mut raw, tables::SEDES),
        }
    }

    /// 用非空集合整体覆盖本地集合；空集合不清空本地数据
    ///
    /// 返回被覆盖的表名。
    pub fn overwrite_non_empty(&mut self, incoming: Collections) -> Vec<&'static str> {
        let mut replaced = Vec::new();
        macro_rules! overwrite {
            ($($field:ident),* $(,)?) => {
                $(
                    if !incoming.$field.is_empty() {
                        self.$field = incoming.$field;
                        replaced.push(record_table(&self.$field));
                    }
                )*
            };
        }
        overwrite!(
            users,
            roles,
            menu_items,
            tables,
            zones,
            inventory,
            orders,
            sales,
            customers,
            expenses,
            delivery_rates,
            sites,
        );
        replaced
    }
}

fn record_table<T: Record>(_: &[T]) -> &'static str {
    T::TABLE
}

/// 按 id 替换或追加
pub(crate) fn upsert_by_id<T: Record>(items: &mut Vec<T>, item: T) {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

/// 状态内容
#[derive(Debug)]
pub struct StateInner {
    pub data: Collections,
    pub settings: Settings,
    pub scope: SiteScope,
    /// 当前登录用户 (不含密码哈希)
    pub session: Option<User>,
}

impl StateInner {
    pub fn order(&self, id: &str) -> Option<&Order> {
        self.data.orders.iter().find(|o| o.id == id)
    }

    pub fn table(&self, id: &str) -> Option<&DiningTable> {
        self.data.tables.iter().find(|t| t.id == id)
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.data.zones.iter().find(|z| z.id == id)
    }

    pub fn menu_item(&self, id: &str) -> Option<&MenuItem> {
        self.data.menu_items.iter().find(|m| m.id == id)
    }

    pub fn role(&self, id: &str) -> Option<&Role> {
        self.data.roles.iter().find(|r| r.id == id)
    }

    /// 占用该桌台的未结束订单
    pub fn active_order_for_table(&self, table_id: &str) -> Option<&Order> {
        self.data.orders.iter().find(|o| o.holds_table(table_id))
    }

    pub fn sale_for_order(&self, order_id: &str) -> Option<&Sale> {
        self.data.sales.iter().find(|s| s.order_id() == order_id)
    }

    pub fn customer_by_phone(&self, phone: &str) -> Option<&Customer> {
        self.data.customers.iter().find(|c| c.phone == phone)
    }

    /// 当前门店上下文中的订单
    pub fn orders_in_scope(&self) -> impl Iterator<Item = &Order> {
        self.data
            .orders
            .iter()
            .filter(|o| self.scope.includes(&o.site_id))
    }

    pub fn tables_in_scope(&self) -> impl Iterator<Item = &DiningTable> {
        self.data
            .tables
            .iter()
            .filter(|t| self.scope.includes(&t.site_id))
    }

    /// 当前门店可售的菜品
    pub fn menu_in_scope(&self) -> impl Iterator<Item = &MenuItem> {
        self.data
            .menu_items
            .iter()
            .filter(|m| match self.scope.site_id() {
                Some(site_id) => m.is_available_at(site_id),
                None => true,
            })
    }

    /// 库存低于警戒线的物料
    pub fn low_stock(&self) -> impl Iterator<Item = &InventoryItem> {
        self.data
            .inventory
            .iter()
            .filter(|i| self.scope.includes(&i.site_id) && i.is_low())
    }
}

/// 对账结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub replaced_tables: Vec<&'static str>,
    pub applied_settings: Vec<String>,
}

/// 共享应用状态
#[derive(Clone)]
pub struct AppState {
    inner: Arc<RwLock<StateInner>>,
}

impl AppState {
    pub fn new(default_site_id: &str) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StateInner {
                data: Collections::default(),
                settings: Settings::default(),
                scope: SiteScope::from_id(default_site_id),
                session: None,
            })),
        }
    }

    /// 只读视图
    pub fn read(&self) -> RwLockReadGuard<'_, StateInner> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, StateInner> {
        self.inner.write()
    }

    pub fn scope(&self) -> SiteScope {
        self.inner.read().scope.clone()
    }

    pub fn session(&self) -> Option<User> {
        self.inner.read().session.clone()
    }

    pub fn settings(&self) -> Settings {
        self.inner.read().settings.clone()
    }

    /// 用远端快照覆盖本地状态
    ///
    /// 非空集合整体覆盖；快照中存在的配置 key 覆盖对应配置块。
    pub fn apply_snapshot(&self, snapshot: DataSnapshot) -> ApplyReport {
        let mut inner = self.inner.write();
        let replaced_tables = inner.data.overwrite_non_empty(snapshot.data);
        let applied_settings = snapshot
            .settings
            .into_iter()
            .filter_map(|(key, value)| inner.settings.apply_value(&key, value).then_some(key))
            .collect();
        ApplyReport {
            replaced_tables,
            applied_settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn zone(id: &str) -> Zone {
        Zone {
            id: id.into(),
            name: id.into(),
            site_id: "sede-principal".into(),
        }
    }

    #[test]
    fn test_overwrite_keeps_local_when_incoming_empty() {
        let mut local = Collections {
            zones: vec![zone("z-1"), zone("z-2")],
            ..Default::default()
        };
        let incoming = Collections {
            users: Vec::new(),
            zones: Vec::new(),
            ..Default::default()
        };
        let replaced = local.overwrite_non_empty(incoming);
        assert!(replaced.is_empty());
        assert_eq!(local.zones.len(), 2);

        let replaced = local.overwrite_non_empty(Collections {
            zones: vec![zone("z-9")],
            ..Default::default()
        });
        assert_eq!(replaced, vec![tables::ZONES]);
        assert_eq!(local.zones, vec![zone("z-9")]);
    }

    #[test]
    fn test_from_raw_skips_malformed_rows() {
        let mut raw = BTreeMap::new();
        raw.insert(
            tables::ZONES,
            vec![
                json!({ "id": "z-1", "name": "Terraza", "sedeId": "s-1" }),
                json!({ "id": "z-2" }),
            ],
        );
        let collections = Collections::from_raw(raw);
        assert_eq!(collections.zones.len(), 1);
        assert!(collections.orders.is_empty());
    }

    #[test]
    fn test_apply_snapshot_settings_present_keys_only() {
        let state = AppState::new("sede-principal");
        let mut settings = BTreeMap::new();
        settings.insert(
            "expense_categories".to_string(),
            json!(["Gas"]),
        );
        let report = state.apply_snapshot(DataSnapshot {
            data: Collections::default(),
            settings,
        });
        assert_eq!(report.applied_settings, vec!["expense_categories".to_string()]);
        let settings = state.settings();
        assert_eq!(settings.expense_categories, vec!["Gas".to_string()]);
        assert!(settings.loyalty_settings.enabled);
    }

    #[test]
    fn test_upsert_by_id() {
        let mut zones = vec![zone("z-1")];
        let mut renamed = zone("z-1");
        renamed.name = "Patio".into();
        upsert_by_id(&mut zones, renamed);
        upsert_by_id(&mut zones, zone("z-2"));
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].name, "Patio");
    }
}
