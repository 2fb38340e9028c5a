//! 库存扣减
//!
//! 有配方的订单行按 `配方用量 × 数量` 扣减对应物料；没有配方时，
//! 按名称 (忽略大小写) 匹配同门店、单位为 `unidad` 的物料扣减 `数量`。
//! 两者都匹配不到的行直接跳过。库存下限为 0。

use rust_decimal::Decimal;
use shared::models::InventoryItem;
use shared::order::OrderItem;
use shared::{AppError, AppResult, ErrorCode};

use crate::core::PosEngine;

/// 按订单行扣减库存，返回被修改的物料 (每个物料一次)
pub fn deduct_for_items(
    inventory: &mut [InventoryItem],
    items: &[OrderItem],
    site_id: &str,
) -> Vec<InventoryItem> {
    let mut touched: Vec<usize> = Vec::new();
    let mut touch = |index: usize| {
        if !touched.contains(&index) {
            touched.push(index);
        }
    };

    for item in items {
        let quantity = Decimal::from(item.quantity);
        match &item.recipe {
            Some(recipe) if !recipe.is_empty() => {
                for ingredient in recipe {
                    let Some(index) = inventory
                        .iter()
                        .position(|i| i.id == ingredient.inventory_item_id)
                    else {
                        tracing::debug!(
                            inventory_item_id = %ingredient.inventory_item_id,
                            "Recipe ingredient not in inventory"
                        );
                        continue;
                    };
                    let taken = inventory[index].deduct(ingredient.quantity * quantity);
                    tracing::debug!(inventory_item_id = %inventory[index].id, %taken, "Stock deducted");
                    touch(index);
                }
            }
            _ => {
                let Some(index) = inventory
                    .iter()
                    .position(|i| i.site_id == site_id && i.matches_unit_name(&item.name))
                else {
                    continue;
                };
                inventory[index].deduct(quantity);
                touch(index);
            }
        }
    }

    touched.into_iter().map(|i| inventory[i].clone()).collect()
}

impl PosEngine {
    /// 手动调整库存 (正数入库，负数出库)，下限为 0
    pub async fn adjust_stock(&self, inventory_item_id: &str, delta: Decimal) -> AppResult<InventoryItem> {
        let item = {
            let mut state = self.state().write();
            let Some(item) = state
                .data
                .inventory
                .iter_mut()
                .find(|i| i.id == inventory_item_id)
            else {
                return Err(self
                    .notices()
                    .reject(AppError::new(ErrorCode::InventoryItemNotFound)));
            };
            item.adjust(delta);
            item.clone()
        };
        self.gateway().upsert(&item).await;
        if item.is_low() {
            self.notices()
                .info(format!("Stock bajo: {} ({} {})", item.name, item.stock, item.unit));
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{MenuItem, RecipeIngredient};

    fn inv(id: &str, name: &str, stock: i64, unit: &str, site: &str) -> InventoryItem {
        InventoryItem {
            id: id.into(),
            name: name.into(),
            stock: Decimal::from(stock),
            unit: unit.into(),
            cost: Decimal::ZERO,
            alert_threshold: Decimal::ZERO,
            site_id: site.into(),
        }
    }

    fn line(name: &str, quantity: u32, recipe: Option<Vec<RecipeIngredient>>) -> OrderItem {
        let menu: MenuItem = serde_json::from_value(serde_json::json!({
            "id": format!("menu-{name}"), "name": name, "category": "x", "price": 1000
        }))
        .unwrap();
        let mut item = OrderItem::from_menu_item(&menu);
        item.quantity = quantity;
        item.recipe = recipe;
        item
    }

    #[test]
    fn test_recipe_deduction_floors_at_zero() {
        let mut inventory = vec![inv("inv-1", "Carne", 10, "unidad", "sede-principal")];
        let recipe = vec![RecipeIngredient {
            inventory_item_id: "inv-1".into(),
            quantity: Decimal::from(2),
        }];
        let touched = deduct_for_items(&mut inventory, &[line("Burger", 3, Some(recipe.clone()))], "sede-principal");
        assert_eq!(touched.len(), 1);
        assert_eq!(inventory[0].stock, Decimal::from(4));

        deduct_for_items(&mut inventory, &[line("Burger", 3, Some(recipe))], "sede-principal");
        assert_eq!(inventory[0].stock, Decimal::ZERO);
    }

    #[test]
    fn test_name_fallback_requires_unit_and_site() {
        let mut inventory = vec![
            inv("inv-a", "Gaseosa", 5, "unidad", "sede-norte"),
            inv("inv-b", "gaseosa", 5, "unidad", "sede-principal"),
            inv("inv-c", "Papas", 5, "kg", "sede-principal"),
        ];
        let items = [line("GASEOSA", 2, None), line("Papas", 1, None), line("Café", 1, None)];
        let touched = deduct_for_items(&mut inventory, &items, "sede-principal");
        assert_eq!(touched.len(), 1);
        assert_eq!(touched[0].id, "inv-b");
        assert_eq!(inventory[0].stock, Decimal::from(5));
        assert_eq!(inventory[1].stock, Decimal::from(3));
        assert_eq!(inventory[2].stock, Decimal::from(5));
    }

    #[test]
    fn test_shared_ingredient_reported_once() {
        let mut inventory = vec![inv("inv-1", "Pan", 20, "unidad", "s")];
        let recipe = Some(vec![RecipeIngredient {
            inventory_item_id: "inv-1".into(),
            quantity: Decimal::ONE,
        }]);
        let items = [line("A", 2, recipe.clone()), line("B", 3, recipe)];
        let touched = deduct_for_items(&mut inventory, &items, "s");
        assert_eq!(touched.len(), 1);
        assert_eq!(touched[0].stock, Decimal::from(15));
    }
}
