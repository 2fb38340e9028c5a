//! 桌台 / 区域管理

use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus, Zone};
use shared::util::generate_id;
use shared::{AppError, AppResult, ErrorCode};

use crate::core::PosEngine;
use crate::core::state::upsert_by_id;

impl PosEngine {
    // ========== Zones ==========

    pub async fn add_zone(&self, name: &str) -> AppResult<Zone> {
        let site_id = self.require_site()?;
        let name = non_blank(name, "El nombre del salón es obligatorio")
            .map_err(|e| self.notices().reject(e))?;
        let zone = Zone {
            id: generate_id("zone"),
            name,
            site_id,
        };
        self.state().write().data.zones.push(zone.clone());
        self.gateway().insert(&zone).await;
        tracing::info!(zone_id = %zone.id, "Zone created");
        Ok(zone)
    }

    pub async fn rename_zone(&self, zone_id: &str, name: &str) -> AppResult<Zone> {
        self.require_site()?;
        let name = non_blank(name, "El nombre del salón es obligatorio")
            .map_err(|e| self.notices().reject(e))?;
        let zone = {
            let mut state = self.state().write();
            let Some(zone) = state.data.zones.iter_mut().find(|z| z.id == zone_id) else {
                return Err(self.notices().reject(AppError::new(ErrorCode::ZoneNotFound)));
            };
            zone.name = name;
            zone.clone()
        };
        self.gateway().upsert(&zone).await;
        Ok(zone)
    }

    /// 删除区域；区域下还有桌台时拒绝
    pub async fn delete_zone(&self, zone_id: &str) -> AppResult<()> {
        self.require_site()?;
        {
            let mut state = self.state().write();
            if state.zone(zone_id).is_none() {
                return Err(self.notices().reject(AppError::new(ErrorCode::ZoneNotFound)));
            }
            let table_count = state.data.tables.iter().filter(|t| t.zone_id == zone_id).count();
            if table_count > 0 {
                return Err(self.notices().reject(
                    AppError::new(ErrorCode::ZoneHasTables)
                        .with_detail("zone_id", zone_id)
                        .with_detail("tables", table_count),
                ));
            }
            state.data.zones.retain(|z| z.id != zone_id);
        }
        self.gateway().delete::<Zone>(zone_id).await;
        tracing::info!(zone_id, "Zone deleted");
        Ok(())
    }

    // ========== Tables ==========

    /// 新桌台属于当前门店，初始为空闲
    pub async fn add_table(&self, data: DiningTableCreate) -> AppResult<DiningTable> {
        let site_id = self.require_site()?;
        let name = non_blank(&data.name, "El nombre de la mesa es obligatorio")
            .map_err(|e| self.notices().reject(e))?;
        let table = {
            let mut state = self.state().write();
            if state.zone(&data.zone_id).is_none() {
                return Err(self.notices().reject(AppError::new(ErrorCode::ZoneNotFound)));
            }
            let table = DiningTable {
                id: generate_id("table"),
                name,
                capacity: data.capacity.max(1),
                zone_id: data.zone_id,
                site_id,
                status: TableStatus::Available,
            };
            state.data.tables.push(table.clone());
            table
        };
        self.gateway().insert(&table).await;
        tracing::info!(table_id = %table.id, "Table created");
        Ok(table)
    }

    pub async fn update_table(&self, table_id: &str, data: DiningTableUpdate) -> AppResult<DiningTable> {
        self.require_site()?;
        let table = {
            let mut state = self.state().write();
            if let Some(zone_id) = &data.zone_id
                && state.zone(zone_id).is_none()
            {
                return Err(self.notices().reject(AppError::new(ErrorCode::ZoneNotFound)));
            }
            let Some(table) = state.data.tables.iter_mut().find(|t| t.id == table_id) else {
                return Err(self.notices().reject(AppError::new(ErrorCode::TableNotFound)));
            };
            if let Some(name) = data.name.filter(|n| !n.trim().is_empty()) {
                table.name = name.trim().to_string();
            }
            if let Some(capacity) = data.capacity {
                table.capacity = capacity.max(1);
            }
            if let Some(zone_id) = data.zone_id {
                table.zone_id = zone_id;
            }
            table.clone()
        };
        self.gateway().upsert(&table).await;
        Ok(table)
    }

    /// 删除桌台；被未结束订单占用时拒绝
    pub async fn delete_table(&self, table_id: &str) -> AppResult<()> {
        self.require_site()?;
        {
            let mut state = self.state().write();
            if state.table(table_id).is_none() {
                return Err(self.notices().reject(AppError::new(ErrorCode::TableNotFound)));
            }
            if let Some(order) = state.active_order_for_table(table_id) {
                return Err(self.notices().reject(
                    AppError::new(ErrorCode::TableOccupied).with_detail("order_id", order.id.clone()),
                ));
            }
            state.data.tables.retain(|t| t.id != table_id);
        }
        self.gateway().delete::<DiningTable>(table_id).await;
        tracing::info!(table_id, "Table deleted");
        Ok(())
    }

    /// 手动设置桌台状态 (预订、清洁等)，不检查订单
    pub async fn set_table_status(&self, table_id: &str, status: TableStatus) -> AppResult<DiningTable> {
        self.require_site()?;
        let table = {
            let mut state = self.state().write();
            let Some(table) = state.table(table_id).cloned() else {
                return Err(self.notices().reject(AppError::new(ErrorCode::TableNotFound)));
            };
            let table = DiningTable { status, ..table };
            upsert_by_id(&mut state.data.tables, table.clone());
            table
        };
        self.gateway()
            .update_fields(
                crate::db::tables::TABLES,
                table_id,
                serde_json::json!({ "status": status }),
            )
            .await;
        tracing::info!(table_id, status = ?status, "Table status set manually");
        Ok(table)
    }
}

fn non_blank(value: &str, message: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use crate::test_support::offline_engine;
    use shared::ErrorCode;
    use shared::models::{DiningTableCreate, DiningTableUpdate, SiteScope, TableStatus};

    #[tokio::test]
    async fn test_zone_with_tables_cannot_be_deleted() {
        let engine = offline_engine();
        let zone = engine.add_zone("Terraza").await.unwrap();
        engine
            .add_table(DiningTableCreate {
                name: "Mesa 1".into(),
                capacity: 4,
                zone_id: zone.id.clone(),
            })
            .await
            .unwrap();

        let err = engine.delete_zone(&zone.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ZoneHasTables);
        assert!(engine.state().read().zone(&zone.id).is_some());
    }

    #[tokio::test]
    async fn test_table_lifecycle() {
        let engine = offline_engine();
        let zone = engine.add_zone("Salón").await.unwrap();
        let table = engine
            .add_table(DiningTableCreate {
                name: " Mesa 2 ".into(),
                capacity: 0,
                zone_id: zone.id.clone(),
            })
            .await
            .unwrap();
        assert_eq!(table.name, "Mesa 2");
        assert_eq!(table.capacity, 1);
        assert_eq!(table.site_id, "sede-principal");
        assert_eq!(table.status, TableStatus::Available);

        let updated = engine
            .update_table(
                &table.id,
                DiningTableUpdate {
                    capacity: Some(6),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.capacity, 6);

        let reserved = engine
            .set_table_status(&table.id, TableStatus::Reserved)
            .await
            .unwrap();
        assert_eq!(reserved.status, TableStatus::Reserved);

        engine.delete_table(&table.id).await.unwrap();
        engine.delete_zone(&zone.id).await.unwrap();
        assert!(engine.state().read().data.zones.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_zone_rejected() {
        let engine = offline_engine();
        let err = engine
            .add_table(DiningTableCreate {
                name: "Mesa".into(),
                capacity: 2,
                zone_id: "zone-x".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ZoneNotFound);
        assert_eq!(
            engine.delete_zone("zone-x").await.unwrap_err().code,
            ErrorCode::ZoneNotFound
        );
    }

    #[tokio::test]
    async fn test_global_scope_rejects_table_writes() {
        let engine = offline_engine();
        engine.state().write().scope = SiteScope::Global;
        let err = engine.add_zone("Terraza").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SiteNotSelected);
    }
}
