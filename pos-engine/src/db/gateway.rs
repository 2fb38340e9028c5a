//! Persistence gateway
//!
//! Uniform CRUD / bulk / subscribe over the remote store, with a per-table
//! local mirror used whenever the remote is unconfigured or unreachable.
//!
//! # 行为
//!
//! - 远端不可用：所有写入落到本地镜像；读取返回镜像，镜像为空时用内置默认值
//! - 远端可用：每次成功读取都刷新镜像 (last-known-good)
//! - 单次写入失败：记录日志后吞掉，同时写入镜像；不回滚本地状态
//! - 全量拉取时 users/roles 读取失败：切换到离线模式 (本次会话内保持)，
//!   只提示一次

use futures::future::join_all;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shared::message::ALL_TABLES;
use shared::models::SETTING_KEYS;
use shared::{ChangeAction, RowChange};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::defaults;
use super::local::LocalMirror;
use super::record::Record;
use super::remote::{RemoteRow, RemoteStore, SettingRow};
use super::tables;
use crate::core::state::Collections;
use crate::notice::NoticeBus;

/// 切换到离线模式时的提示
pub const OFFLINE_NOTICE: &str = "Error cargando datos. Modo Offline activado.";

/// 一次全量拉取的结果
#[derive(Debug, Clone, Default)]
pub struct DataSnapshot {
    pub data: Collections,
    /// key → 原始 JSON；缺失的 key 表示远端没有该配置
    pub settings: BTreeMap<String, Value>,
}

/// 变更订阅句柄
#[derive(Debug)]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        self.token.cancel();
    }

    /// 被取消或被新的订阅替换后为 false
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

enum MirrorOp {
    Upsert(Vec<Value>),
    Delete(String),
    Merge(String, Map<String, Value>),
}

pub struct Gateway {
    remote: Option<Arc<dyn RemoteStore>>,
    mirror: LocalMirror,
    offline: AtomicBool,
    notices: NoticeBus,
    subscription: Mutex<Option<CancellationToken>>,
}

impl Gateway {
    pub fn new(
        remote: Option<Arc<dyn RemoteStore>>,
        mirror: LocalMirror,
        notices: NoticeBus,
    ) -> Self {
        if remote.is_none() {
            tracing::warn!("Remote store not configured, running in offline mode");
        }
        Self {
            remote,
            mirror,
            offline: AtomicBool::new(false),
            notices,
            subscription: Mutex::new(None),
        }
    }

    pub fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }

    /// 未配置远端或已降级为离线
    pub fn is_offline(&self) -> bool {
        self.remote.is_none() || self.offline.load(Ordering::SeqCst)
    }

    fn online(&self) -> Option<&Arc<dyn RemoteStore>> {
        if self.offline.load(Ordering::SeqCst) {
            return None;
        }
        self.remote.as_ref()
    }

    /// 降级为离线模式；只在第一次切换时提示
    pub fn go_offline(&self, reason: &str) {
        if !self.offline.swap(true, Ordering::SeqCst) {
            tracing::warn!(reason, "Switching to offline mode");
            self.notices.error(OFFLINE_NOTICE);
        }
    }

    // ========== Writes ==========

    pub async fn insert<T: Record>(&self, item: &T) {
        let Some(row) = to_row(item) else { return };
        match self.online() {
            Some(remote) => {
                if let Err(e) = remote.insert(T::TABLE, row.clone()).await {
                    tracing::error!(table = T::TABLE, id = %row.id, error = %e, "Remote insert failed");
                    self.mirror_apply(T::TABLE, MirrorOp::Upsert(vec![row.data]));
                }
            }
            None => self.mirror_apply(T::TABLE, MirrorOp::Upsert(vec![row.data])),
        }
    }

    pub async fn upsert<T: Record>(&self, item: &T) {
        self.bulk_upsert(std::slice::from_ref(item)).await;
    }

    pub async fn bulk_upsert<T: Record>(&self, items: &[T]) {
        let rows: Vec<RemoteRow> = items.iter().filter_map(to_row).collect();
        if rows.is_empty() {
            return;
        }
        match self.online() {
            Some(remote) => {
                let count = rows.len();
                if let Err(e) = remote.upsert(T::TABLE, rows.clone()).await {
                    tracing::error!(table = T::TABLE, count, error = %e, "Remote upsert failed");
                    self.mirror_apply(T::TABLE, MirrorOp::Upsert(into_data(rows)));
                }
            }
            None => self.mirror_apply(T::TABLE, MirrorOp::Upsert(into_data(rows))),
        }
    }

    pub async fn delete<T: Record>(&self, id: &str) {
        match self.online() {
            Some(remote) => {
                if let Err(e) = remote.delete(T::TABLE, id).await {
                    tracing::error!(table = T::TABLE, id, error = %e, "Remote delete failed");
                    self.mirror_apply(T::TABLE, MirrorOp::Delete(id.to_string()));
                }
            }
            None => self.mirror_apply(T::TABLE, MirrorOp::Delete(id.to_string())),
        }
    }

    /// 把部分字段浅合并到已有行
    pub async fn update_fields(&self, table: &str, id: &str, patch: Value) {
        let Value::Object(patch) = patch else {
            tracing::error!(table, id, "update_fields expects a JSON object");
            return;
        };
        let Some(remote) = self.online() else {
            self.mirror_apply(table, MirrorOp::Merge(id.to_string(), patch));
            return;
        };

        let current = match remote.select_one(table, id).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                tracing::error!(table, id, "Row not found for update");
                return;
            }
            Err(e) => {
                tracing::error!(table, id, error = %e, "Fetching row for update failed");
                self.mirror_apply(table, MirrorOp::Merge(id.to_string(), patch));
                return;
            }
        };

        let mut data = current.data;
        merge_fields(&mut data, &patch);
        let row = RemoteRow {
            id: id.to_string(),
            data,
        };
        if let Err(e) = remote.upsert(table, vec![row]).await {
            tracing::error!(table, id, error = %e, "Updating fields failed");
            self.mirror_apply(table, MirrorOp::Merge(id.to_string(), patch));
        }
    }

    /// 远端表为空时写入初始数据；返回是否写入
    pub async fn seed_table<T: Record>(&self, items: &[T]) -> bool {
        let Some(remote) = self.online() else {
            return false;
        };
        match remote.select_all(T::TABLE).await {
            Ok(rows) if rows.is_empty() => {
                tracing::info!(table = T::TABLE, count = items.len(), "Seeding empty table");
                let rows: Vec<RemoteRow> = items.iter().filter_map(to_row).collect();
                match remote.upsert(T::TABLE, rows).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::error!(table = T::TABLE, error = %e, "Seeding failed");
                        false
                    }
                }
            }
            Ok(_) => false,
            Err(e) => {
                tracing::error!(table = T::TABLE, error = %e, "Checking table before seed failed");
                false
            }
        }
    }

    pub async fn save_setting(&self, key: &str, value: &Value) {
        if let Some(remote) = self.online() {
            let row = SettingRow {
                key: key.to_string(),
                value: value.clone(),
            };
            match remote.upsert_setting(row).await {
                Ok(()) => return,
                Err(e) => tracing::error!(key, error = %e, "Saving setting failed"),
            }
        }
        if let Err(e) = self.mirror.write_setting(key, value) {
            tracing::error!(key, error = %e, "Mirroring setting failed");
        }
    }

    // ========== Reads ==========

    /// 读取整张表
    ///
    /// None 表示读取失败，区别于空表。
    pub async fn get_all<T: Record>(&self) -> Option<Vec<T>> {
        self.fetch_table(T::TABLE).await.map(decode_rows)
    }

    pub async fn fetch_table(&self, table: &str) -> Option<Vec<Value>> {
        let Some(remote) = self.online() else {
            return self.read_offline(table);
        };
        match remote.select_all(table).await {
            Ok(rows) => {
                let items: Vec<Value> = rows.into_iter().map(row_data).collect();
                if let Err(e) = self.mirror.write_table(table, &items) {
                    tracing::error!(table, error = %e, "Mirroring table failed");
                }
                Some(items)
            }
            Err(e) => {
                tracing::error!(table, error = %e, "Fetching table failed");
                None
            }
        }
    }

    fn read_offline(&self, table: &str) -> Option<Vec<Value>> {
        match self.mirror.read_table(table) {
            Ok(Some(items)) => Some(items),
            Ok(None) => Some(defaults::default_rows(table)),
            Err(e) => {
                tracing::error!(table, error = %e, "Reading mirror failed");
                None
            }
        }
    }

    pub async fn fetch_settings(&self) -> Option<BTreeMap<String, Value>> {
        let Some(remote) = self.online() else {
            return Some(self.read_settings_offline());
        };
        match remote.select_settings().await {
            Ok(rows) => {
                let settings: BTreeMap<String, Value> =
                    rows.into_iter().map(|r| (r.key, r.value)).collect();
                for (key, value) in &settings {
                    if let Err(e) = self.mirror.write_setting(key, value) {
                        tracing::error!(key, error = %e, "Mirroring setting failed");
                    }
                }
                Some(settings)
            }
            Err(e) => {
                tracing::error!(error = %e, "Fetching settings failed");
                None
            }
        }
    }

    fn read_settings_offline(&self) -> BTreeMap<String, Value> {
        SETTING_KEYS
            .iter()
            .filter_map(|key| {
                let value = match self.mirror.read_setting(key) {
                    Ok(Some(value)) => Some(value),
                    Ok(None) => defaults::default_setting(key),
                    Err(e) => {
                        tracing::error!(key, error = %e, "Reading setting from mirror failed");
                        defaults::default_setting(key)
                    }
                };
                value.map(|v| (key.to_string(), v))
            })
            .collect()
    }

    /// 拉取全部实体表和配置
    ///
    /// users 或 roles 读取失败视为连接失败：切换离线并改读镜像。
    /// 其他表失败时该表为空 (对账时不会覆盖本地数据)。
    pub async fn fetch_all_tables(&self) -> DataSnapshot {
        if self.online().is_some() {
            match self.fetch_all_online().await {
                Some(snapshot) => return snapshot,
                None => self.go_offline("users/roles fetch failed"),
            }
        }
        tracing::debug!("Loading data from local mirror");
        let raw = tables::ENTITY_TABLES
            .iter()
            .map(|table| (*table, self.read_offline(table).unwrap_or_default()))
            .collect();
        DataSnapshot {
            data: Collections::from_raw(raw),
            settings: self.read_settings_offline(),
        }
    }

    async fn fetch_all_online(&self) -> Option<DataSnapshot> {
        let results = join_all(tables::ENTITY_TABLES.iter().map(|t| self.fetch_table(t))).await;

        let mut raw = BTreeMap::new();
        for (table, result) in tables::ENTITY_TABLES.iter().zip(results) {
            match result {
                Some(items) => {
                    raw.insert(*table, items);
                }
                None if *table == tables::USERS || *table == tables::ROLES => return None,
                None => {
                    raw.insert(*table, Vec::new());
                }
            }
        }

        let settings = self.fetch_settings().await.unwrap_or_default();
        Some(DataSnapshot {
            data: Collections::from_raw(raw),
            settings,
        })
    }

    // ========== Subscribe ==========

    /// 订阅白名单表 (或 `*`) 的行变更
    ///
    /// 新订阅会替换旧订阅。离线或远端不支持推送时返回 None。
    /// 必须在 tokio 运行时内调用。
    pub fn subscribe<F>(&self, tables: &[&str], on_change: F) -> Option<Subscription>
    where
        F: Fn(RowChange) + Send + Sync + 'static,
    {
        let mut rx = self.online()?.changes()?;
        let token = CancellationToken::new();
        if let Some(previous) = self.subscription.lock().replace(token.clone()) {
            previous.cancel();
        }

        let whitelist: Vec<String> = tables.iter().map(|t| t.to_string()).collect();
        let task_token = token.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    result = rx.recv() => match result {
                        Ok(change) => {
                            if change.matches(&whitelist) {
                                tracing::debug!(%change, "Row change");
                                on_change(change);
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!("Subscription lagged {n} changes");
                            on_change(RowChange::new(ALL_TABLES, ChangeAction::Update, None));
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
            tracing::debug!("Subscription closed");
        });

        Some(Subscription { token })
    }

    /// 取消当前订阅
    pub fn unsubscribe_all(&self) {
        if let Some(token) = self.subscription.lock().take() {
            token.cancel();
        }
    }

    // ========== Mirror ==========

    fn mirror_apply(&self, table: &str, op: MirrorOp) {
        let mut items = match self.mirror.read_table(table) {
            Ok(Some(items)) => items,
            Ok(None) => defaults::default_rows(table),
            Err(e) => {
                tracing::error!(table, error = %e, "Reading mirror before write failed");
                return;
            }
        };

        match op {
            MirrorOp::Upsert(values) => {
                for value in values {
                    let id = value_id(&value).map(str::to_string);
                    match items.iter_mut().find(|v| id.is_some() && value_id(v) == id.as_deref()) {
                        Some(existing) => *existing = value,
                        None => items.push(value),
                    }
                }
            }
            MirrorOp::Delete(id) => items.retain(|v| value_id(v) != Some(id.as_str())),
            MirrorOp::Merge(id, patch) => {
                match items.iter_mut().find(|v| value_id(v) == Some(id.as_str())) {
                    Some(existing) => merge_fields(existing, &patch),
                    None => {
                        tracing::warn!(table, id, "Row not found in mirror for update");
                        return;
                    }
                }
            }
        }

        match self.mirror.write_table(table, &items) {
            Ok(()) => tracing::debug!(table, count = items.len(), "Mirrored write"),
            Err(e) => tracing::error!(table, error = %e, "Mirror write failed"),
        }
    }
}

fn value_id(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}

fn to_row<T: Record>(item: &T) -> Option<RemoteRow> {
    match serde_json::to_value(item) {
        Ok(data) => Some(RemoteRow {
            id: item.id().to_string(),
            data,
        }),
        Err(e) => {
            tracing::error!(table = T::TABLE, id = item.id(), error = %e, "Serializing row failed");
            None
        }
    }
}

fn into_data(rows: Vec<RemoteRow>) -> Vec<Value> {
    rows.into_iter().map(|r| r.data).collect()
}

/// 行数据；`data` 中缺少 id 时用行 id 补上
fn row_data(row: RemoteRow) -> Value {
    let RemoteRow { id, mut data } = row;
    if let Value::Object(map) = &mut data {
        map.entry("id").or_insert(Value::String(id));
    }
    data
}

fn merge_fields(target: &mut Value, patch: &Map<String, Value>) {
    match target {
        Value::Object(map) => {
            for (key, value) in patch {
                map.insert(key.clone(), value.clone());
            }
        }
        other => *other = Value::Object(patch.clone()),
    }
}

/// 解码行；无法解析的行记录日志后跳过
pub(crate) fn decode_rows<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|value| {
            let id = value_id(&value).unwrap_or("?").to_string();
            serde_json::from_value(value)
                .map_err(|e| tracing::warn!(id, error = %e, "Skipping malformed row"))
                .ok()
        })
        .collect()
}
