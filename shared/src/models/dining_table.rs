//! Dining Table Model

use serde::{Deserialize, Serialize};

/// 桌台状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
    Cleaning,
}

/// Dining table entity (桌台)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: String,
    pub name: String,
    pub capacity: u32,
    pub zone_id: String,
    #[serde(rename = "sedeId")]
    pub site_id: String,
    #[serde(default)]
    pub status: TableStatus,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableCreate {
    pub name: String,
    pub capacity: u32,
    pub zone_id: String,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableUpdate {
    pub name: Option<String>,
    pub capacity: Option<u32>,
    pub zone_id: Option<String>,
}
