//! 桌台占用状态
//!
//! 桌台 `occupied` ⇔ 存在绑定该桌台的未结束堂食订单。
//! 这里的函数只改内存集合，返回实际发生变化的桌台供持久化。

use shared::models::{DiningTable, TableStatus};
use shared::order::Order;

fn set_status(tables: &mut [DiningTable], table_id: &str, status: TableStatus) -> Option<DiningTable> {
    let Some(table) = tables.iter_mut().find(|t| t.id == table_id) else {
        tracing::warn!(table_id, "Table not found for status change");
        return None;
    };
    if table.status == status {
        return None;
    }
    tracing::debug!(table_id, from = ?table.status, to = ?status, "Table status changed");
    table.status = status;
    Some(table.clone())
}

/// 标记占用；已占用时返回 None
pub fn occupy(tables: &mut [DiningTable], table_id: &str) -> Option<DiningTable> {
    set_status(tables, table_id, TableStatus::Occupied)
}

/// 释放为空闲；已空闲时返回 None
pub fn release(tables: &mut [DiningTable], table_id: &str) -> Option<DiningTable> {
    set_status(tables, table_id, TableStatus::Available)
}

/// 订单状态变化后同步桌台
///
/// 未结束的堂食订单占用桌台，结束的订单释放桌台。
pub fn sync_for_order(tables: &mut [DiningTable], order: &Order) -> Option<DiningTable> {
    let table_id = order.table_id()?;
    if order.status.is_terminal() {
        release(tables, table_id)
    } else {
        occupy(tables, table_id)
    }
}

/// 占用状态与订单不一致的桌台
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyMismatch {
    pub table_id: String,
    pub status: TableStatus,
    pub has_active_order: bool,
}

/// 检查 `occupied ⇔ 有未结束订单`
///
/// 手动设置的 reserved / cleaning 且无订单时不算不一致。
pub fn occupancy_mismatches(tables: &[DiningTable], orders: &[Order]) -> Vec<OccupancyMismatch> {
    tables
        .iter()
        .filter_map(|table| {
            let has_active_order = orders.iter().any(|o| o.holds_table(&table.id));
            let consistent = match table.status {
                TableStatus::Occupied => has_active_order,
                _ => !has_active_order,
            };
            (!consistent).then(|| OccupancyMismatch {
                table_id: table.id.clone(),
                status: table.status,
                has_active_order,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderChannel, OrderStatus};

    fn table(id: &str, status: TableStatus) -> DiningTable {
        DiningTable {
            id: id.into(),
            name: id.into(),
            capacity: 4,
            zone_id: "zone-1".into(),
            site_id: "sede-principal".into(),
            status,
        }
    }

    fn order(table_id: &str, status: OrderStatus) -> Order {
        let mut order: Order = serde_json::from_value(serde_json::json!({
            "id": "ord-1", "status": "open", "items": [],
            "createdAt": "2026-01-01T12:00:00Z", "userId": "u", "sedeId": "sede-principal",
            "orderType": "dine-in", "tableId": table_id
        }))
        .unwrap();
        order.status = status;
        order
    }

    #[test]
    fn test_occupy_and_release_are_idempotent() {
        let mut tables = vec![table("t-1", TableStatus::Available)];
        assert!(occupy(&mut tables, "t-1").is_some());
        assert!(occupy(&mut tables, "t-1").is_none());
        assert_eq!(tables[0].status, TableStatus::Occupied);

        assert!(release(&mut tables, "t-1").is_some());
        assert!(release(&mut tables, "t-1").is_none());
        assert_eq!(tables[0].status, TableStatus::Available);

        assert!(occupy(&mut tables, "missing").is_none());
    }

    #[test]
    fn test_sync_for_order() {
        let mut tables = vec![table("t-1", TableStatus::Available)];
        sync_for_order(&mut tables, &order("t-1", OrderStatus::Open));
        assert_eq!(tables[0].status, TableStatus::Occupied);
        sync_for_order(&mut tables, &order("t-1", OrderStatus::Cancelled));
        assert_eq!(tables[0].status, TableStatus::Available);

        let mut to_go: Order = order("t-1", OrderStatus::Open);
        to_go.channel = OrderChannel::to_go("Ana", None);
        assert!(sync_for_order(&mut tables, &to_go).is_none());
    }

    #[test]
    fn test_mismatches() {
        let tables = vec![
            table("t-1", TableStatus::Occupied),
            table("t-2", TableStatus::Occupied),
            table("t-3", TableStatus::Cleaning),
            table("t-4", TableStatus::Available),
        ];
        let orders = vec![order("t-1", OrderStatus::Ready), order("t-4", OrderStatus::Open)];
        let mismatches = occupancy_mismatches(&tables, &orders);
        let ids: Vec<&str> = mismatches.iter().map(|m| m.table_id.as_str()).collect();
        assert_eq!(ids, vec!["t-2", "t-4"]);
        assert!(mismatches[1].has_active_order);
    }
}
