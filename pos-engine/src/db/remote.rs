//! Remote store seam
//!
//! Every entity table on the remote side holds rows of `{ id, data }` where
//! `data` is the camelCase JSON document; the `settings` table holds
//! `{ key, value }` rows.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::RowChange;
use thiserror::Error;
use tokio::sync::broadcast;

/// 远端实体行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRow {
    pub id: String,
    pub data: Value,
}

/// 远端配置行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingRow {
    pub key: String,
    pub value: Value,
}

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote unavailable: {0}")]
    Unavailable(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

impl From<TransportError> for shared::AppError {
    fn from(err: TransportError) -> Self {
        shared::AppError::transport(err.to_string())
    }
}

/// 远端存储接口
///
/// 实现：[`super::HttpRemoteStore`] (PostgREST 风格 REST)、
/// [`super::MemoryRemoteStore`] (进程内，用于测试和本地演示)。
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// 读取整张表
    async fn select_all(&self, table: &str) -> TransportResult<Vec<RemoteRow>>;

    /// 按 id 读取单行
    async fn select_one(&self, table: &str, id: &str) -> TransportResult<Option<RemoteRow>>;

    async fn insert(&self, table: &str, row: RemoteRow) -> TransportResult<()>;

    /// 按 id 合并写入 (批量)
    async fn upsert(&self, table: &str, rows: Vec<RemoteRow>) -> TransportResult<()>;

    async fn delete(&self, table: &str, id: &str) -> TransportResult<()>;

    async fn select_settings(&self) -> TransportResult<Vec<SettingRow>>;

    async fn upsert_setting(&self, row: SettingRow) -> TransportResult<()>;

    /// 行变更流；不支持实时推送的实现返回 None
    fn changes(&self) -> Option<broadcast::Receiver<RowChange>>;
}
