//! 订单的持久化与状态流转

use shared::models::Capability;
use shared::order::{DeliveryStatus, Order, OrderChannel, OrderStatus, PaymentMethod, Sale};
use shared::util::now;
use shared::{AppError, AppResult, ErrorCode};

use super::draft::OrderDraft;
use crate::core::PosEngine;
use crate::core::state::upsert_by_id;
use crate::tables::occupancy;

pub const ORDER_SAVED_NOTICE: &str = "Orden guardada";

impl PosEngine {
    /// 新建订单草稿
    ///
    /// 堂食订单的桌台必须存在且没有其他未结束订单。
    pub fn new_order(&self, channel: OrderChannel) -> AppResult<OrderDraft> {
        self.require(Capability::Pos)?;
        let user = self.current_user()?;
        if let OrderChannel::DineIn {
            table_id: Some(table_id),
        } = &channel
        {
            let state = self.state().read();
            if state.table(table_id).is_none() {
                return Err(self.notices().reject(AppError::new(ErrorCode::TableNotFound)));
            }
            if let Some(existing) = state.active_order_for_table(table_id) {
                return Err(self.notices().reject(
                    AppError::new(ErrorCode::TableOccupied).with_detail("order_id", existing.id.clone()),
                ));
            }
        }
        OrderDraft::start(&self.state().scope(), &user.id, channel).map_err(|e| self.notices().reject(e))
    }

    /// 快速销售 (自取，"Venta Rápida")
    pub fn quick_sale(&self) -> AppResult<OrderDraft> {
        self.require(Capability::Pos)?;
        let user = self.current_user()?;
        OrderDraft::quick_sale(&self.state().scope(), &user.id).map_err(|e| self.notices().reject(e))
    }

    /// 在 POS 中打开桌台：已有未结束订单则继续编辑，否则新建堂食订单
    pub fn open_table_in_pos(&self, table_id: &str) -> AppResult<OrderDraft> {
        if let Some(order) = self.active_order_for_table(table_id) {
            tracing::debug!(table_id, order_id = %order.id, "Resuming active order for table");
            return Ok(OrderDraft::from_order(order));
        }
        self.new_order(OrderChannel::dine_in(table_id))
    }

    pub fn active_order_for_table(&self, table_id: &str) -> Option<Order> {
        self.state().read().active_order_for_table(table_id).cloned()
    }

    /// 保存订单 (新订单 insert，已保存的 upsert)
    ///
    /// 未结束的堂食订单占用桌台。
    pub async fn save_order(&self, draft: &mut OrderDraft) -> AppResult<Order> {
        let order = self.persist_draft(draft).await?;
        self.notices().success(ORDER_SAVED_NOTICE);
        Ok(order)
    }

    /// 保存并结账
    pub async fn checkout(&self, mut draft: OrderDraft, payment_method: PaymentMethod) -> AppResult<Sale> {
        if draft.is_empty() {
            return Err(self.notices().reject(AppError::new(ErrorCode::OrderEmpty)));
        }
        let order = self.persist_draft(&mut draft).await?;
        self.complete_sale(&order, payment_method).await
    }

    async fn persist_draft(&self, draft: &mut OrderDraft) -> AppResult<Order> {
        if draft.is_empty() {
            return Err(self.notices().reject(AppError::new(ErrorCode::OrderEmpty)));
        }

        let (order, table) = {
            let mut state = self.state().write();
            let mut order = draft.order().clone();

            // 状态由 update_order_status 维护，以已保存的为准
            if let Some(stored) = state.order(&order.id) {
                if stored.status.is_terminal() {
                    return Err(self.notices().reject(terminal_error(stored)));
                }
                order.status = stored.status;
                order.ready_at = stored.ready_at;
            }

            if let Some(table_id) = order.table_id() {
                if state.table(table_id).is_none() {
                    return Err(self.notices().reject(AppError::new(ErrorCode::TableNotFound)));
                }
                if let Some(holder) = state
                    .data
                    .orders
                    .iter()
                    .find(|o| o.id != order.id && o.holds_table(table_id))
                {
                    return Err(self.notices().reject(
                        AppError::new(ErrorCode::TableOccupied).with_detail("order_id", holder.id.clone()),
                    ));
                }
            }

            upsert_by_id(&mut state.data.orders, order.clone());
            let table = occupancy::sync_for_order(&mut state.data.tables, &order);
            (order, table)
        };

        if draft.is_persisted() {
            self.gateway().upsert(&order).await;
        } else {
            self.gateway().insert(&order).await;
            draft.mark_persisted();
        }
        if let Some(table) = &table {
            self.gateway().upsert(table).await;
        }
        draft.replace_order(order.clone());
        tracing::info!(order_id = %order.id, items = order.items.len(), "Order saved");
        Ok(order)
    }

    /// 订单状态流转
    ///
    /// 进入 ready 时记录 readyAt；cancelled 释放桌台；已结束的订单不可修改。
    /// 完成订单必须走结账。
    pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> AppResult<Order> {
        if status == OrderStatus::Completed {
            return Err(self.notices().reject(AppError::with_message(
                ErrorCode::InvalidRequest,
                "Cobra la orden para completarla",
            )));
        }

        let (order, table) = {
            let mut state = self.state().write();
            let Some(stored) = state.order(order_id) else {
                return Err(self.notices().reject(AppError::new(ErrorCode::OrderNotFound)));
            };
            if stored.status.is_terminal() {
                return Err(self.notices().reject(terminal_error(stored)));
            }

            let mut order = stored.clone();
            order.status = status;
            if status == OrderStatus::Ready && order.ready_at.is_none() {
                order.ready_at = Some(now());
            }
            upsert_by_id(&mut state.data.orders, order.clone());
            let table = occupancy::sync_for_order(&mut state.data.tables, &order);
            (order, table)
        };

        self.gateway().upsert(&order).await;
        if let Some(table) = &table {
            self.gateway().upsert(table).await;
        }
        tracing::info!(order_id, status = status.as_str(), "Order status updated");
        Ok(order)
    }

    /// 外卖配送状态 (quoting → confirmed → dispatched → delivered)
    pub async fn update_delivery_status(&self, order_id: &str, status: DeliveryStatus) -> AppResult<Order> {
        let order = {
            let mut state = self.state().write();
            let Some(stored) = state.order(order_id) else {
                return Err(self.notices().reject(AppError::new(ErrorCode::OrderNotFound)));
            };
            if stored.status.is_terminal() {
                return Err(self.notices().reject(terminal_error(stored)));
            }
            let mut order = stored.clone();
            let OrderChannel::Delivery { delivery_info } = &mut order.channel else {
                return Err(self
                    .notices()
                    .reject(AppError::validation("La orden no es a domicilio")));
            };
            delivery_info.delivery_status = status;
            upsert_by_id(&mut state.data.orders, order.clone());
            order
        };
        self.gateway().upsert(&order).await;
        tracing::info!(order_id, status = ?status, "Delivery status updated");
        Ok(order)
    }
}

fn terminal_error(order: &Order) -> AppError {
    let code = match order.status {
        OrderStatus::Cancelled => ErrorCode::OrderAlreadyCancelled,
        _ => ErrorCode::OrderAlreadyCompleted,
    };
    AppError::new(code).with_detail("order_id", order.id.clone())
}
