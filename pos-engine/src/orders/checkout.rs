//! 结账：订单 → 销售记录
//!
//! 本地状态在一次写锁内完成全部变更 (销售、订单完成、桌台释放、库存、
//! 会员)，外部观察者看不到半完成的销售。之后按 销售 → 订单 → 库存 →
//! 顾客 → 桌台 的顺序写远端，每一步独立、失败只记日志，不回滚。

use shared::models::{Capability, Customer};
use shared::order::{Order, OrderStatus, PaymentMethod, Sale};
use shared::util::{generate_id, now};
use shared::{AppError, AppResult, ErrorCode};

use crate::core::PosEngine;
use crate::core::state::upsert_by_id;
use crate::inventory::deduct_for_items;
use crate::loyalty::{LoyaltyOutcome, apply_sale};
use crate::tables::occupancy;

pub const SALE_COMPLETED_NOTICE: &str = "Venta completada";

impl PosEngine {
    /// 完成订单并生成销售记录
    ///
    /// 订单必须已保存且非空；订单已结束、已有销售记录或桌台被其他订单占用时拒绝。
    pub async fn complete_sale(&self, order: &Order, payment_method: PaymentMethod) -> AppResult<Sale> {
        self.require(Capability::Pos)?;
        let timestamp = now();

        let (sale, completed, inventory, loyalty, table) = {
            let mut guard = self.state().write();
            let state = &mut *guard;

            if order.is_empty() {
                return Err(self.notices().reject(AppError::new(ErrorCode::OrderEmpty)));
            }
            let Some(stored_status) = state.order(&order.id).map(|o| o.status) else {
                return Err(self.notices().reject(
                    AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order.id.clone()),
                ));
            };
            if state.sale_for_order(&order.id).is_some()
                || order.status == OrderStatus::Completed
                || stored_status == OrderStatus::Completed
            {
                return Err(self.notices().reject(
                    AppError::new(ErrorCode::OrderAlreadyCompleted).with_detail("order_id", order.id.clone()),
                ));
            }
            if order.status == OrderStatus::Cancelled || stored_status == OrderStatus::Cancelled {
                return Err(self.notices().reject(
                    AppError::new(ErrorCode::OrderAlreadyCancelled).with_detail("order_id", order.id.clone()),
                ));
            }

            if let Some(table_id) = order.table_id()
                && let Some(holder) = state
                    .data
                    .orders
                    .iter()
                    .find(|o| o.id != order.id && o.holds_table(table_id))
            {
                return Err(self.notices().reject(
                    AppError::new(ErrorCode::TableOccupied).with_detail("order_id", holder.id.clone()),
                ));
            }

            let completed = Order {
                status: OrderStatus::Completed,
                ..order.clone()
            };
            let sale = Sale {
                id: generate_id("sale"),
                order: completed.clone(),
                total: completed.total(),
                timestamp,
                payment_method,
                site_id: completed.site_id.clone(),
            };

            state.data.sales.push(sale.clone());
            upsert_by_id(&mut state.data.orders, completed.clone());
            let table = match completed.table_id() {
                Some(table_id) if state.active_order_for_table(table_id).is_some() => None,
                _ => occupancy::sync_for_order(&mut state.data.tables, &completed),
            };
            let inventory =
                deduct_for_items(&mut state.data.inventory, &completed.items, &completed.site_id);
            let loyalty = completed.customer_contact().and_then(|contact| {
                apply_sale(
                    &mut state.data.customers,
                    &state.settings.loyalty_settings,
                    &contact,
                    sale.total,
                    &completed.site_id,
                    timestamp,
                )
            });

            (sale, completed, inventory, loyalty, table)
        };

        tracing::info!(
            sale_id = %sale.id,
            order_id = %completed.id,
            total = %sale.total,
            payment_method = ?sale.payment_method,
            "Sale completed"
        );

        self.gateway().insert(&sale).await;
        self.gateway().upsert(&completed).await;
        for item in &inventory {
            self.gateway().upsert(item).await;
        }
        if let Some(outcome) = &loyalty {
            self.persist_loyalty(outcome).await;
        }
        if let Some(table) = &table {
            self.gateway().upsert(table).await;
        }

        self.notices()
            .success(format!("{}: ${}", SALE_COMPLETED_NOTICE, sale.total));
        Ok(sale)
    }

    async fn persist_loyalty(&self, outcome: &LoyaltyOutcome) {
        if outcome.created {
            self.gateway().insert::<Customer>(&outcome.customer).await;
        } else {
            self.gateway().upsert::<Customer>(&outcome.customer).await;
        }
        if let Some(tier) = &outcome.new_tier {
            tracing::info!(customer_id = %outcome.customer.id, tier = %tier.name, "Loyalty tier changed");
            self.notices().info(format!(
                "¡{} ahora es cliente {}!",
                outcome.customer.name, tier.name
            ));
        }
    }
}
