//! Delivery Rate Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 配送费率 (按区域/距离的固定报价)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRate {
    pub id: String,
    pub name: String,
    pub cost: Decimal,
    #[serde(rename = "sedeId", default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
}
