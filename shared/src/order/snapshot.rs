//! Order record
//!
//! One document per order in the `orders` table. The channel binding is
//! flattened into the same JSON object under the `orderType` tag.

use super::item::OrderItem;
use super::types::{DeliveryInfo, OrderChannel, OrderStatus, OrderType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 订单
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: String,
    #[serde(rename = "sedeId")]
    pub site_id: String,
    #[serde(flatten)]
    pub channel: OrderChannel,
}

/// 可用于会员积分的客户联系方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerContact {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
}

impl Order {
    pub fn order_type(&self) -> OrderType {
        self.channel.order_type()
    }

    /// 堂食订单绑定的桌台
    pub fn table_id(&self) -> Option<&str> {
        match &self.channel {
            OrderChannel::DineIn { table_id } => table_id.as_deref(),
            _ => None,
        }
    }

    pub fn delivery_info(&self) -> Option<&DeliveryInfo> {
        match &self.channel {
            OrderChannel::Delivery { delivery_info } => Some(delivery_info),
            _ => None,
        }
    }

    /// 是否占用桌台：未结束的堂食订单且绑定了桌台
    pub fn holds_table(&self, table_id: &str) -> bool {
        self.status.is_active() && self.table_id() == Some(table_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Σ(price × quantity)
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(OrderItem::subtotal).sum()
    }

    pub fn delivery_cost(&self) -> Decimal {
        self.delivery_info()
            .and_then(|d| d.delivery_cost)
            .unwrap_or(Decimal::ZERO)
    }

    /// 小计 + 运费
    pub fn total(&self) -> Decimal {
        self.subtotal() + self.delivery_cost()
    }

    /// 外卖信息或自取客户信息；姓名和电话都非空才返回
    pub fn customer_contact(&self) -> Option<CustomerContact> {
        let (name, phone, address) = match &self.channel {
            OrderChannel::Delivery { delivery_info } => (
                delivery_info.name.as_str(),
                Some(delivery_info.phone.as_str()),
                Some(delivery_info.address.as_str()).filter(|a| !a.is_empty()),
            ),
            OrderChannel::ToGo {
                to_go_name,
                to_go_phone,
            } => (to_go_name.as_str(), to_go_phone.as_deref(), None),
            OrderChannel::DineIn { .. } => return None,
        };
        let phone = phone.map(str::trim).filter(|p| !p.is_empty())?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(CustomerContact {
            name: name.to_string(),
            phone: phone.to_string(),
            address: address.map(str::to_string),
        })
    }
}
