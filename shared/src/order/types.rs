//! Shared types for the order lifecycle

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Status
// ============================================================================

/// 订单状态
///
/// `open → pending_confirmation → ready → completed/cancelled`；
/// completed 与 cancelled 为终态。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingConfirmation,
    Open,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// 新订单的初始状态：外卖等待确认，其余直接开单
    pub fn initial_for(order_type: OrderType) -> Self {
        match order_type {
            OrderType::Delivery => Self::PendingConfirmation,
            OrderType::DineIn | OrderType::ToGo => Self::Open,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingConfirmation => "pending_confirmation",
            Self::Open => "open",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

// ============================================================================
// Channel
// ============================================================================

/// 订单渠道
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderType {
    #[serde(rename = "dine-in")]
    DineIn,
    #[serde(rename = "delivery")]
    Delivery,
    #[serde(rename = "to-go")]
    ToGo,
}

/// 外卖配送状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// 等待报价运费
    #[default]
    Quoting,
    Confirmed,
    Dispatched,
    Delivered,
}

/// 外卖客户与配送信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_cost: Option<Decimal>,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
}

/// 订单绑定的渠道 (堂食桌台 / 外卖信息 / 自取客户)
///
/// 以 `orderType` 为标签展开到订单 JSON 中。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "orderType", rename_all_fields = "camelCase")]
pub enum OrderChannel {
    #[serde(rename = "dine-in")]
    DineIn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table_id: Option<String>,
    },
    #[serde(rename = "delivery")]
    Delivery { delivery_info: DeliveryInfo },
    #[serde(rename = "to-go")]
    ToGo {
        #[serde(default)]
        to_go_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_go_phone: Option<String>,
    },
}

impl OrderChannel {
    pub fn dine_in(table_id: impl Into<String>) -> Self {
        Self::DineIn {
            table_id: Some(table_id.into()),
        }
    }

    /// 新建外卖渠道，配送状态从 quoting 开始
    pub fn delivery(name: impl Into<String>, phone: impl Into<String>, address: impl Into<String>) -> Self {
        Self::Delivery {
            delivery_info: DeliveryInfo {
                name: name.into(),
                phone: phone.into(),
                address: address.into(),
                delivery_cost: None,
                delivery_status: DeliveryStatus::Quoting,
            },
        }
    }

    pub fn to_go(name: impl Into<String>, phone: Option<String>) -> Self {
        Self::ToGo {
            to_go_name: name.into(),
            to_go_phone: phone,
        }
    }

    pub fn order_type(&self) -> OrderType {
        match self {
            Self::DineIn { .. } => OrderType::DineIn,
            Self::Delivery { .. } => OrderType::Delivery,
            Self::ToGo { .. } => OrderType::ToGo,
        }
    }
}

// ============================================================================
// Payment
// ============================================================================

/// 支付方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Efectivo,
    Tarjeta,
    Transferencia,
}

impl std::str::FromStr for PaymentMethod {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Efectivo" => Ok(Self::Efectivo),
            "Tarjeta" => Ok(Self::Tarjeta),
            "Transferencia" => Ok(Self::Transferencia),
            other => Err(crate::error::AppError::new(
                crate::error::ErrorCode::PaymentInvalidMethod,
            )
            .with_detail("method", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status() {
        assert_eq!(
            OrderStatus::initial_for(OrderType::Delivery),
            OrderStatus::PendingConfirmation
        );
        assert_eq!(OrderStatus::initial_for(OrderType::DineIn), OrderStatus::Open);
        assert_eq!(OrderStatus::initial_for(OrderType::ToGo), OrderStatus::Open);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Ready.is_active());
        assert!(OrderStatus::PendingConfirmation.is_active());
    }

    #[test]
    fn test_status_serialize() {
        let json = serde_json::to_string(&OrderStatus::PendingConfirmation).unwrap();
        assert_eq!(json, "\"pending_confirmation\"");
    }

    #[test]
    fn test_channel_tagged_by_order_type() {
        let json = serde_json::to_value(OrderChannel::dine_in("mesa-5")).unwrap();
        assert_eq!(json["orderType"], "dine-in");
        assert_eq!(json["tableId"], "mesa-5");

        let json = serde_json::to_value(OrderChannel::to_go("Juan", None)).unwrap();
        assert_eq!(json["orderType"], "to-go");
        assert_eq!(json["toGoName"], "Juan");
        assert!(json.get("toGoPhone").is_none());

        let channel: OrderChannel = serde_json::from_value(serde_json::json!({
            "orderType": "delivery",
            "deliveryInfo": { "name": "Ana", "phone": "300", "address": "Cra 1" }
        }))
        .unwrap();
        match channel {
            OrderChannel::Delivery { delivery_info } => {
                assert_eq!(delivery_info.delivery_status, DeliveryStatus::Quoting);
                assert!(delivery_info.delivery_cost.is_none());
            }
            other => panic!("unexpected channel {other:?}"),
        }
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("Tarjeta".parse::<PaymentMethod>().unwrap(), PaymentMethod::Tarjeta);
        let err = "Bitcoin".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::PaymentInvalidMethod);
    }
}
