//! Reconciler — 后台对账 worker
//!
//! 用远端快照覆盖本地状态：
//!
//! 1. 启动时全量拉取一次
//! 2. 订阅远端行变更，合并窗口内的多次通知只触发一次拉取
//! 3. 定期全量拉取兜底 (推送丢失、离线期间的变更)

use shared::RowChange;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::state::{AppState, ApplyReport};
use crate::db::{Gateway, tables};
use crate::tables::occupancy_mismatches;

/// 变更通知缓冲
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// 全量拉取一次并覆盖本地状态
///
/// 非空集合整体覆盖本地集合，空集合不清空本地数据。
pub async fn reconcile_once(gateway: &Gateway, state: &AppState) -> ApplyReport {
    let snapshot = gateway.fetch_all_tables().await;
    let report = state.apply_snapshot(snapshot);
    tracing::debug!(
        tables = ?report.replaced_tables,
        settings = ?report.applied_settings,
        "Reconciled local state"
    );

    let inner = state.read();
    for mismatch in occupancy_mismatches(&inner.data.tables, &inner.data.orders) {
        tracing::warn!(
            table_id = %mismatch.table_id,
            status = ?mismatch.status,
            has_active_order = mismatch.has_active_order,
            "Table status disagrees with orders"
        );
    }
    report
}

pub struct Reconciler {
    gateway: Arc<Gateway>,
    state: AppState,
    interval: Duration,
    debounce: Duration,
}

impl Reconciler {
    pub fn new(gateway: Arc<Gateway>, state: AppState, interval: Duration, debounce: Duration) -> Self {
        Self {
            gateway,
            state,
            interval,
            debounce,
        }
    }

    /// 运行直到 `shutdown` 被取消
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            debounce_ms = self.debounce.as_millis() as u64,
            "Reconciler started"
        );

        reconcile_once(&self.gateway, &self.state).await;

        let (tx, mut rx) = mpsc::channel::<RowChange>(CHANGE_CHANNEL_CAPACITY);
        let mut whitelist: Vec<&str> = tables::ENTITY_TABLES.to_vec();
        whitelist.push(tables::SETTINGS);
        let subscription = self.gateway.subscribe(&whitelist, move |change| {
            // 缓冲满时已经有拉取在等待，丢弃即可
            let _ = tx.try_send(change);
        });
        if subscription.is_none() {
            tracing::info!("Realtime changes unavailable, relying on periodic reconciliation");
        }

        let mut full_fetch = tokio::time::interval(self.interval);
        full_fetch.tick().await; // skip immediate tick

        let mut debounce_deadline: Option<Instant> = None;

        loop {
            let sleep_until = debounce_deadline.unwrap_or_else(|| Instant::now() + self.interval);

            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Reconciler shutting down");
                    break;
                }

                _ = tokio::time::sleep_until(sleep_until), if debounce_deadline.is_some() => {
                    debounce_deadline = None;
                    reconcile_once(&self.gateway, &self.state).await;
                }

                _ = full_fetch.tick() => {
                    debounce_deadline = None;
                    reconcile_once(&self.gateway, &self.state).await;
                }

                Some(change) = rx.recv(), if subscription.is_some() => {
                    tracing::debug!(%change, "Change notification");
                    if debounce_deadline.is_none() {
                        debounce_deadline = Some(Instant::now() + self.debounce);
                    }
                }
            }
        }

        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        tracing::info!("Reconciler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{LocalMirror, MemoryRemoteStore, RemoteStore};
    use crate::notice::NoticeBus;
    use serde_json::json;
    use shared::ChangeAction;

    fn setup() -> (Arc<MemoryRemoteStore>, Arc<Gateway>, AppState) {
        let remote = Arc::new(MemoryRemoteStore::new());
        let gateway = Arc::new(Gateway::new(
            Some(remote.clone() as Arc<dyn RemoteStore>),
            LocalMirror::open_in_memory().unwrap(),
            NoticeBus::new(),
        ));
        (remote, gateway, AppState::new("sede-principal"))
    }

    #[tokio::test]
    async fn test_reconcile_never_clears_with_empty_result() {
        let (remote, gateway, state) = setup();
        remote.put(
            tables::ZONES,
            "z-1",
            json!({ "id": "z-1", "name": "Terraza", "sedeId": "sede-principal" }),
        );
        reconcile_once(&gateway, &state).await;
        assert_eq!(state.read().data.zones.len(), 1);

        remote.fail_table(tables::ZONES);
        let report = reconcile_once(&gateway, &state).await;
        assert!(!report.replaced_tables.contains(&tables::ZONES));
        assert_eq!(state.read().data.zones.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_are_debounced_into_one_fetch() {
        let (remote, gateway, state) = setup();
        let shutdown = CancellationToken::new();
        let reconciler = Reconciler::new(
            gateway.clone(),
            state.clone(),
            Duration::from_secs(300),
            Duration::from_millis(300),
        );
        let handle = tokio::spawn(reconciler.run(shutdown.clone()));
        tokio::time::sleep(Duration::from_millis(10)).await;

        for i in 0..5 {
            let id = format!("z-{i}");
            remote.put(
                tables::ZONES,
                &id,
                json!({ "id": id, "name": "Salón", "sedeId": "sede-principal" }),
            );
            remote.notify(RowChange::new(tables::ZONES, ChangeAction::Insert, Some(id)));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(state.read().data.zones.is_empty());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(state.read().data.zones.len(), 5);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
