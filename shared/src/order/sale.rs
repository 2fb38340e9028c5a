//! Sale record

use super::snapshot::Order;
use super::types::PaymentMethod;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 销售记录：每个完成的订单恰好一条，不可变
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// 结账时的订单快照
    pub order: Order,
    pub total: Decimal,
    pub timestamp: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    #[serde(rename = "sedeId")]
    pub site_id: String,
}

impl Sale {
    pub fn order_id(&self) -> &str {
        &self.order.id
    }
}
