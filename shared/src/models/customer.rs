//! Customer Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer entity (顾客 / 会员)
///
/// `phone` 是跨订单匹配的自然键。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub total_spent: Decimal,
    #[serde(default)]
    pub visit_count: u32,
    pub last_visit: DateTime<Utc>,
    #[serde(default)]
    pub loyalty_points: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loyalty_tier_id: Option<String>,
    #[serde(rename = "sedeId")]
    pub site_id: String,
}
