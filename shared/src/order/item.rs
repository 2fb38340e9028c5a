//! Order line items

use crate::models::{MenuItem, RecipeIngredient};
use crate::util::generate_instance_id;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 订单行选中的修饰项
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItemOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wing_sauces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fry_sauces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submenu_choice: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gelato_flavors: Vec<String>,
}

impl ItemOptions {
    pub fn is_empty(&self) -> bool {
        self.wing_sauces.is_empty()
            && self.fry_sauces.is_empty()
            && self.submenu_choice.is_none()
            && self.gelato_flavors.is_empty()
    }
}

/// 订单行：加入时对菜品的快照
///
/// `id` 是菜品 ID，`instance_id` 区分同一菜品的不同行。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "id")]
    pub menu_item_id: String,
    pub instance_id: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Vec<RecipeIngredient>>,
    #[serde(default)]
    pub has_wings: bool,
    #[serde(default)]
    pub has_fries: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submenu_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_choices: Option<u32>,
    pub quantity: u32,
    #[serde(flatten)]
    pub options: ItemOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// 是否已送厨打印；任何修改都会重置
    #[serde(default)]
    pub is_printed: bool,
}

impl OrderItem {
    /// 从菜品创建数量为 1 的新行
    pub fn from_menu_item(menu_item: &MenuItem) -> Self {
        Self {
            menu_item_id: menu_item.id.clone(),
            instance_id: generate_instance_id(&menu_item.id),
            name: menu_item.name.clone(),
            category: menu_item.category.clone(),
            price: menu_item.price,
            recipe: menu_item.recipe.clone(),
            has_wings: menu_item.has_wings,
            has_fries: menu_item.has_fries,
            submenu_key: menu_item.submenu_key.clone(),
            max_choices: menu_item.max_choices,
            quantity: 1,
            options: ItemOptions::default(),
            notes: None,
            is_printed: false,
        }
    }

    /// price × quantity
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// 订单行的部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPatch {
    pub quantity: Option<u32>,
    pub notes: Option<String>,
    pub options: Option<ItemOptions>,
}

impl OrderItemPatch {
    /// 应用到订单行；数量 0 被忽略 (删除行走 remove)
    pub fn apply_to(&self, item: &mut OrderItem) {
        if let Some(quantity) = self.quantity.filter(|q| *q >= 1) {
            item.quantity = quantity;
        }
        if let Some(notes) = &self.notes {
            item.notes = if notes.trim().is_empty() {
                None
            } else {
                Some(notes.clone())
            };
        }
        if let Some(options) = &self.options {
            item.options = options.clone();
        }
        item.is_printed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wings() -> MenuItem {
        serde_json::from_value(serde_json::json!({
            "id": "menu-alitas",
            "name": "Alitas x8",
            "category": "Alitas",
            "price": 22000,
            "hasWings": true,
            "hasFries": true
        }))
        .unwrap()
    }

    #[test]
    fn test_from_menu_item_snapshot() {
        let item = OrderItem::from_menu_item(&wings());
        assert_eq!(item.menu_item_id, "menu-alitas");
        assert!(item.instance_id.starts_with("menu-alitas-"));
        assert_eq!(item.quantity, 1);
        assert!(item.has_wings && item.has_fries);
        assert!(!item.is_printed);
    }

    #[test]
    fn test_subtotal() {
        let mut item = OrderItem::from_menu_item(&wings());
        item.quantity = 3;
        assert_eq!(item.subtotal(), Decimal::from(66000));
    }

    #[test]
    fn test_patch_resets_printed() {
        let mut item = OrderItem::from_menu_item(&wings());
        item.is_printed = true;
        OrderItemPatch {
            quantity: Some(0),
            notes: Some("sin picante".into()),
            options: None,
        }
        .apply_to(&mut item);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.notes.as_deref(), Some("sin picante"));
        assert!(!item.is_printed);
    }

    #[test]
    fn test_serialize_flattens_options() {
        let mut item = OrderItem::from_menu_item(&wings());
        item.options.wing_sauces = vec!["bbq".into()];
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "menu-alitas");
        assert_eq!(json["wingSauces"][0], "bbq");
        assert!(json.get("frySauces").is_none());

        let back: OrderItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }
}
