//! OrderDraft — one order in progress
//!
//! Pure, synchronous mutations over an [`Order`] held in memory. Nothing
//! here touches the state or the gateway; [`crate::PosEngine::save_order`]
//! and [`crate::PosEngine::checkout`] persist the result.

use rust_decimal::Decimal;
use shared::models::{MenuItem, MenuOptionCatalog, SiteScope};
use shared::order::{
    DeliveryStatus, ItemOptions, Order, OrderChannel, OrderItem, OrderItemPatch, OrderStatus,
    ParsedOrder,
};
use shared::util::{generate_id, now};
use shared::{AppError, AppResult, ErrorCode};

use super::options::validate_options;

/// 快速销售订单的客户名
pub const QUICK_SALE_NAME: &str = "Venta Rápida";

/// 加入菜品的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// 已加入订单
    Added { instance_id: String },
    /// 菜品有可选项，等待 confirm_options
    NeedsOptions,
}

#[derive(Debug, Clone)]
pub struct OrderDraft {
    order: Order,
    /// 等待选项确认的订单行
    staged: Option<OrderItem>,
    /// 是否已写入过 orders 表
    persisted: bool,
}

impl OrderDraft {
    /// 新建订单；全局视图下不允许录单
    pub fn start(scope: &SiteScope, user_id: &str, channel: OrderChannel) -> AppResult<Self> {
        let site_id = scope
            .site_id()
            .ok_or_else(|| AppError::new(ErrorCode::SiteNotSelected))?;
        Ok(Self {
            order: Order {
                id: generate_id("ord"),
                status: OrderStatus::initial_for(channel.order_type()),
                items: Vec::new(),
                created_at: now(),
                ready_at: None,
                user_id: user_id.to_string(),
                site_id: site_id.to_string(),
                channel,
            },
            staged: None,
            persisted: false,
        })
    }

    /// 自取订单，客户名 "Venta Rápida"，无电话
    pub fn quick_sale(scope: &SiteScope, user_id: &str) -> AppResult<Self> {
        Self::start(scope, user_id, OrderChannel::to_go(QUICK_SALE_NAME, None))
    }

    /// 继续编辑已保存的订单
    pub fn from_order(order: Order) -> Self {
        Self {
            order,
            staged: None,
            persisted: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.order.id
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn into_order(self) -> Order {
        self.order
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.order.items
    }

    pub fn staged(&self) -> Option<&OrderItem> {
        self.staged.as_ref()
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub(crate) fn mark_persisted(&mut self) {
        self.persisted = true;
    }

    pub(crate) fn replace_order(&mut self, order: Order) {
        self.order = order;
    }

    pub fn is_empty(&self) -> bool {
        self.order.items.is_empty()
    }

    // ========== Items ==========

    /// 加入一份菜品；有可选项的菜品先暂存
    pub fn add_item(&mut self, menu_item: &MenuItem) -> AddOutcome {
        let item = OrderItem::from_menu_item(menu_item);
        if menu_item.has_options() {
            if let Some(previous) = self.staged.replace(item) {
                tracing::debug!(menu_item_id = %previous.menu_item_id, "Replacing staged item");
            }
            return AddOutcome::NeedsOptions;
        }
        let instance_id = item.instance_id.clone();
        self.order.items.push(item);
        AddOutcome::Added { instance_id }
    }

    /// 确认暂存菜品的选项并加入订单
    pub fn confirm_options(
        &mut self,
        options: ItemOptions,
        catalog: &MenuOptionCatalog,
    ) -> AppResult<String> {
        let staged = self
            .staged
            .as_ref()
            .ok_or_else(|| AppError::new(ErrorCode::NoStagedItem))?;
        validate_options(staged, &options, catalog)?;

        let Some(mut item) = self.staged.take() else {
            return Err(AppError::new(ErrorCode::NoStagedItem));
        };
        item.options = options;
        item.is_printed = false;
        let instance_id = item.instance_id.clone();
        self.order.items.push(item);
        Ok(instance_id)
    }

    pub fn discard_staged(&mut self) -> Option<OrderItem> {
        self.staged.take()
    }

    fn item_mut(&mut self, instance_id: &str) -> Option<&mut OrderItem> {
        self.order
            .items
            .iter_mut()
            .find(|i| i.instance_id == instance_id)
    }

    pub fn update_item(&mut self, instance_id: &str, patch: &OrderItemPatch) -> AppResult<()> {
        let item = self
            .item_mut(instance_id)
            .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
        patch.apply_to(item);
        Ok(())
    }

    pub fn remove_item(&mut self, instance_id: &str) -> AppResult<OrderItem> {
        let index = self
            .order
            .items
            .iter()
            .position(|i| i.instance_id == instance_id)
            .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
        Ok(self.order.items.remove(index))
    }

    /// 数量 +1；行不存在时不做任何事
    pub fn increment_qty(&mut self, instance_id: &str) -> bool {
        match self.item_mut(instance_id) {
            Some(item) => {
                item.quantity += 1;
                item.is_printed = false;
                true
            }
            None => false,
        }
    }

    /// 数量 -1，低于 1 时删除该行；行不存在时不做任何事
    pub fn decrement_qty(&mut self, instance_id: &str) -> bool {
        let Some(index) = self
            .order
            .items
            .iter()
            .position(|i| i.instance_id == instance_id)
        else {
            return false;
        };
        let item = &mut self.order.items[index];
        if item.quantity <= 1 {
            self.order.items.remove(index);
        } else {
            item.quantity -= 1;
            item.is_printed = false;
        }
        true
    }

    pub fn clear_items(&mut self) {
        self.order.items.clear();
        self.staged = None;
    }

    // ========== Customer / delivery ==========

    /// 设置客户信息：外卖写入配送信息，自取写入自取字段；堂食忽略
    pub fn set_customer(&mut self, name: &str, phone: &str, address: Option<&str>) -> bool {
        match &mut self.order.channel {
            OrderChannel::Delivery { delivery_info } => {
                delivery_info.name = name.trim().to_string();
                delivery_info.phone = phone.trim().to_string();
                if let Some(address) = address {
                    delivery_info.address = address.trim().to_string();
                }
                true
            }
            OrderChannel::ToGo {
                to_go_name,
                to_go_phone,
            } => {
                *to_go_name = name.trim().to_string();
                let phone = phone.trim();
                *to_go_phone = (!phone.is_empty()).then(|| phone.to_string());
                true
            }
            OrderChannel::DineIn { .. } => {
                tracing::debug!(order_id = %self.order.id, "Dine-in order has no customer fields");
                false
            }
        }
    }

    /// 设置运费，配送状态 quoting → confirmed
    pub fn set_delivery_quote(&mut self, cost: Decimal) -> AppResult<()> {
        if cost < Decimal::ZERO {
            return Err(AppError::validation("El costo de envío no puede ser negativo"));
        }
        let OrderChannel::Delivery { delivery_info } = &mut self.order.channel else {
            return Err(AppError::validation("La orden no es a domicilio"));
        };
        delivery_info.delivery_cost = Some(cost);
        if delivery_info.delivery_status == DeliveryStatus::Quoting {
            delivery_info.delivery_status = DeliveryStatus::Confirmed;
        }
        Ok(())
    }

    /// 导入外部解析器的结果；未知菜品跳过
    ///
    /// 返回加入的行数。
    pub fn apply_parsed_order(&mut self, parsed: &ParsedOrder, menu: &[MenuItem]) -> usize {
        let mut added = 0;
        for parsed_item in &parsed.items {
            let Some(menu_item) = menu.iter().find(|m| m.id == parsed_item.menu_item_id) else {
                tracing::debug!(menu_item_id = %parsed_item.menu_item_id, "Skipping unknown menu item");
                continue;
            };
            let mut item = OrderItem::from_menu_item(menu_item);
            item.quantity = parsed_item.quantity.max(1);
            item.notes = parsed_item
                .notes
                .clone()
                .filter(|n| !n.trim().is_empty());
            self.order.items.push(item);
            added += 1;
        }

        if let Some(customer) = &parsed.customer {
            let address = customer.address.as_deref().filter(|a| !a.trim().is_empty());
            match (&self.order.channel, address) {
                (OrderChannel::Delivery { .. }, Some(address)) => {
                    self.set_customer(&customer.name, &customer.phone, Some(address));
                }
                (OrderChannel::ToGo { .. }, _) => {
                    self.set_customer(&customer.name, &customer.phone, None);
                }
                _ => {}
            }
        }
        added
    }

    // ========== Totals ==========

    pub fn subtotal(&self) -> Decimal {
        self.order.subtotal()
    }

    /// 小计 + 运费
    pub fn total(&self) -> Decimal {
        self.order.total()
    }

    pub fn item_count(&self) -> u32 {
        self.order.item_count()
    }
}
