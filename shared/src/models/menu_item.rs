//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 配方成分：售出一份菜品消耗的库存量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub inventory_item_id: String,
    pub quantity: Decimal,
}

/// Menu item entity (菜品)
///
/// 被历史订单引用后只能通过显式编辑修改；订单行保存的是加入时的快照。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Vec<RecipeIngredient>>,

    // === 可配置选项 ===
    /// 需要选择鸡翅酱料
    #[serde(default)]
    pub has_wings: bool,
    /// 需要选择薯条酱料
    #[serde(default)]
    pub has_fries: bool,
    /// 子菜单选择 (例如饮料)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submenu_key: Option<String>,
    /// 冰淇淋口味上限
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_choices: Option<u32>,

    /// None = 所有门店可售
    #[serde(rename = "sedeId", default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
}

impl MenuItem {
    /// 加入订单前是否必须经过选项步骤
    pub fn has_options(&self) -> bool {
        self.has_wings || self.has_fries || self.submenu_key.is_some() || self.max_choices.is_some()
    }

    /// 在指定门店是否可售
    pub fn is_available_at(&self, site_id: &str) -> bool {
        self.site_id.as_deref().is_none_or(|s| s == site_id)
    }
}
