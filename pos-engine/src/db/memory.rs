//! MemoryRemoteStore — in-process remote
//!
//! Holds tables in memory, broadcasts a [`RowChange`] for every write and
//! can be told to fail (whole store or single tables) to exercise the
//! degradation paths.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use shared::{ChangeAction, RowChange};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

use super::remote::{RemoteRow, RemoteStore, SettingRow, TransportError, TransportResult};

const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// 写操作日志条目 (表, id)
pub type WriteLogEntry = (String, String);

pub struct MemoryRemoteStore {
    tables: Mutex<HashMap<String, BTreeMap<String, Value>>>,
    settings: Mutex<BTreeMap<String, Value>>,
    changes_tx: broadcast::Sender<RowChange>,
    failing: AtomicBool,
    failing_tables: Mutex<HashSet<String>>,
    write_log: Mutex<Vec<WriteLogEntry>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        let (changes_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            tables: Mutex::new(HashMap::new()),
            settings: Mutex::new(BTreeMap::new()),
            changes_tx,
            failing: AtomicBool::new(false),
            failing_tables: Mutex::new(HashSet::new()),
            write_log: Mutex::new(Vec::new()),
        }
    }

    /// 模拟整个远端不可达
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 模拟单表写入/读取失败
    pub fn fail_table(&self, table: &str) {
        self.failing_tables.lock().insert(table.to_string());
    }

    pub fn heal_table(&self, table: &str) {
        self.failing_tables.lock().remove(table);
    }

    /// 直接放入一行，不广播、不记日志 (用于准备测试数据)
    pub fn put(&self, table: &str, id: &str, data: Value) {
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .insert(id.to_string(), data);
    }

    pub fn put_setting(&self, key: &str, value: Value) {
        self.settings.lock().insert(key.to_string(), value);
    }

    pub fn get(&self, table: &str, id: &str) -> Option<Value> {
        self.tables
            .lock()
            .get(table)
            .and_then(|rows| rows.get(id).cloned())
    }

    pub fn setting(&self, key: &str) -> Option<Value> {
        self.settings.lock().get(key).cloned()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables.lock().get(table).map_or(0, BTreeMap::len)
    }

    /// 成功写入的顺序记录
    pub fn write_log(&self) -> Vec<WriteLogEntry> {
        self.write_log.lock().clone()
    }

    pub fn clear_write_log(&self) {
        self.write_log.lock().clear();
    }

    /// 手动触发一条变更通知
    pub fn notify(&self, change: RowChange) {
        // 没有订阅者时 send 返回 Err，忽略
        let _ = self.changes_tx.send(change);
    }

    fn check(&self, table: &str) -> TransportResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable("remote store offline".into()));
        }
        if self.failing_tables.lock().contains(table) {
            return Err(TransportError::Unavailable(format!("table {table} unavailable")));
        }
        Ok(())
    }

    fn record(&self, table: &str, id: &str, action: ChangeAction) {
        self.write_log
            .lock()
            .push((table.to_string(), id.to_string()));
        self.notify(RowChange::new(table, action, Some(id.to_string())));
    }
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn select_all(&self, table: &str) -> TransportResult<Vec<RemoteRow>> {
        self.check(table)?;
        Ok(self
            .tables
            .lock()
            .get(table)
            .map(|rows| {
                rows.iter()
                    .map(|(id, data)| RemoteRow {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn select_one(&self, table: &str, id: &str) -> TransportResult<Option<RemoteRow>> {
        self.check(table)?;
        Ok(self.get(table, id).map(|data| RemoteRow {
            id: id.to_string(),
            data,
        }))
    }

    async fn insert(&self, table: &str, row: RemoteRow) -> TransportResult<()> {
        self.check(table)?;
        {
            let mut tables = self.tables.lock();
            let rows = tables.entry(table.to_string()).or_default();
            if rows.contains_key(&row.id) {
                return Err(TransportError::Status {
                    status: 409,
                    body: format!("duplicate key {}", row.id),
                });
            }
            rows.insert(row.id.clone(), row.data);
        }
        self.record(table, &row.id, ChangeAction::Insert);
        Ok(())
    }

    async fn upsert(&self, table: &str, rows: Vec<RemoteRow>) -> TransportResult<()> {
        self.check(table)?;
        for row in rows {
            let existed = self
                .tables
                .lock()
                .entry(table.to_string())
                .or_default()
                .insert(row.id.clone(), row.data)
                .is_some();
            let action = if existed {
                ChangeAction::Update
            } else {
                ChangeAction::Insert
            };
            self.record(table, &row.id, action);
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> TransportResult<()> {
        self.check(table)?;
        let removed = self
            .tables
            .lock()
            .get_mut(table)
            .and_then(|rows| rows.remove(id))
            .is_some();
        if removed {
            self.record(table, id, ChangeAction::Delete);
        }
        Ok(())
    }

    async fn select_settings(&self) -> TransportResult<Vec<SettingRow>> {
        self.check(super::tables::SETTINGS)?;
        Ok(self
            .settings
            .lock()
            .iter()
            .map(|(key, value)| SettingRow {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    async fn upsert_setting(&self, row: SettingRow) -> TransportResult<()> {
        self.check(super::tables::SETTINGS)?;
        let existed = self
            .settings
            .lock()
            .insert(row.key.clone(), row.value)
            .is_some();
        let action = if existed {
            ChangeAction::Update
        } else {
            ChangeAction::Insert
        };
        self.record(super::tables::SETTINGS, &row.key, action);
        Ok(())
    }

    fn changes(&self) -> Option<broadcast::Receiver<RowChange>> {
        Some(self.changes_tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_broadcasts_and_logs() {
        let store = MemoryRemoteStore::new();
        let mut rx = store.changes().unwrap();

        store
            .upsert(
                "orders",
                vec![RemoteRow {
                    id: "ord-1".into(),
                    data: json!({ "id": "ord-1" }),
                }],
            )
            .await
            .unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change.table, "orders");
        assert_eq!(change.action, ChangeAction::Insert);
        assert_eq!(store.write_log(), vec![("orders".into(), "ord-1".into())]);
        assert_eq!(store.row_count("orders"), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate() {
        let store = MemoryRemoteStore::new();
        let row = RemoteRow {
            id: "sale-1".into(),
            data: json!({}),
        };
        store.insert("sales", row.clone()).await.unwrap();
        assert!(store.insert("sales", row).await.is_err());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryRemoteStore::new();
        store.fail_table("inventory");
        assert!(store.select_all("inventory").await.is_err());
        assert!(store.select_all("orders").await.is_ok());

        store.heal_table("inventory");
        store.set_failing(true);
        assert!(store.select_all("orders").await.is_err());
        assert!(store.select_settings().await.is_err());
    }
}
