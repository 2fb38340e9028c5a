//! Settings Models
//!
//! 远端 `settings` 表按 key 存放配置块：
//!
//! | key | 类型 |
//! |-----|------|
//! | `printer_settings` | 不透明 JSON (打印机是外部组件) |
//! | `category_configs` | [`CategoryConfig`] 列表 |
//! | `loyalty_settings` | [`LoyaltySettings`] |
//! | `expense_categories` | 字符串列表 |
//! | `menu_options` | [`MenuOptionCatalog`] |

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const PRINTER_SETTINGS_KEY: &str = "printer_settings";
pub const CATEGORY_CONFIGS_KEY: &str = "category_configs";
pub const LOYALTY_SETTINGS_KEY: &str = "loyalty_settings";
pub const EXPENSE_CATEGORIES_KEY: &str = "expense_categories";
pub const MENU_OPTIONS_KEY: &str = "menu_options";

pub const SETTING_KEYS: [&str; 5] = [
    PRINTER_SETTINGS_KEY,
    CATEGORY_CONFIGS_KEY,
    LOYALTY_SETTINGS_KEY,
    EXPENSE_CATEGORIES_KEY,
    MENU_OPTIONS_KEY,
];

/// 菜单分类的显示配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryConfig {
    pub name: String,
    pub color: String,
}

/// 会员等级：积分达到 `min_points` 即可进入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyTier {
    pub id: String,
    pub name: String,
    pub min_points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltySettings {
    pub enabled: bool,
    /// 每消费 1 比索获得的积分
    pub points_per_peso: Decimal,
    #[serde(default)]
    pub tiers: Vec<LoyaltyTier>,
}

impl LoyaltySettings {
    /// floor(total × points_per_peso)
    pub fn points_for(&self, total: Decimal) -> i64 {
        (total * self.points_per_peso).floor().to_i64().unwrap_or(0)
    }

    /// 满足门槛的最高等级
    pub fn tier_for(&self, points: i64) -> Option<&LoyaltyTier> {
        self.tiers
            .iter()
            .filter(|t| t.min_points <= points)
            .max_by_key(|t| t.min_points)
    }
}

impl Default for LoyaltySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            points_per_peso: Decimal::new(1, 2),
            tiers: vec![
                LoyaltyTier {
                    id: "tier-bronce".into(),
                    name: "Bronce".into(),
                    min_points: 0,
                },
                LoyaltyTier {
                    id: "tier-plata".into(),
                    name: "Plata".into(),
                    min_points: 1000,
                },
                LoyaltyTier {
                    id: "tier-oro".into(),
                    name: "Oro".into(),
                    min_points: 5000,
                },
            ],
        }
    }
}

/// 酱料选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sauce {
    pub key: String,
    pub name: String,
}

impl Sauce {
    fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// 菜品可选项目录 (酱料、子菜单、口味)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOptionCatalog {
    pub wing_sauces: Vec<Sauce>,
    pub fry_sauces: Vec<Sauce>,
    /// submenuKey -> 可选项
    pub submenu_choices: BTreeMap<String, Vec<String>>,
    pub gelato_flavors: Vec<String>,
}

impl Default for MenuOptionCatalog {
    fn default() -> Self {
        let mut submenu_choices = BTreeMap::new();
        submenu_choices.insert(
            "bebida".to_string(),
            ["Coca-Cola", "Sprite", "Agua", "Limonada"]
                .map(String::from)
                .to_vec(),
        );
        submenu_choices.insert(
            "proteina".to_string(),
            ["Res", "Pollo", "Cerdo"].map(String::from).to_vec(),
        );
        Self {
            wing_sauces: vec![
                Sauce::new("bbq", "BBQ"),
                Sauce::new("bufalo", "Búfalo"),
                Sauce::new("miel-mostaza", "Miel Mostaza"),
                Sauce::new("teriyaki", "Teriyaki"),
            ],
            fry_sauces: vec![
                Sauce::new("tomate", "Tomate"),
                Sauce::new("mayonesa", "Mayonesa"),
                Sauce::new("rosada", "Rosada"),
                Sauce::new("ajo", "Ajo"),
            ],
            submenu_choices,
            gelato_flavors: ["Vainilla", "Chocolate", "Fresa", "Maracuyá", "Arequipe"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// 所有配置块
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub printer_settings: Value,
    pub category_configs: Vec<CategoryConfig>,
    pub loyalty_settings: LoyaltySettings,
    pub expense_categories: Vec<String>,
    pub menu_options: MenuOptionCatalog,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            printer_settings: serde_json::json!({ "paperWidth": 80, "autoPrint": false }),
            category_configs: vec![
                CategoryConfig {
                    name: "Hamburguesas".into(),
                    color: "#DC2626".into(),
                },
                CategoryConfig {
                    name: "Alitas".into(),
                    color: "#EA580C".into(),
                },
                CategoryConfig {
                    name: "Bebidas".into(),
                    color: "#2563EB".into(),
                },
                CategoryConfig {
                    name: "Postres".into(),
                    color: "#DB2777".into(),
                },
            ],
            loyalty_settings: LoyaltySettings::default(),
            expense_categories: ["Insumos", "Servicios", "Nómina", "Arriendo", "Otros"]
                .map(String::from)
                .to_vec(),
            menu_options: MenuOptionCatalog::default(),
        }
    }
}

impl Settings {
    /// 用 key → JSON 覆盖对应配置块；无法解析的值保留旧配置并返回 false
    pub fn apply_value(&mut self, key: &str, value: Value) -> bool {
        fn parse<T: serde::de::DeserializeOwned>(key: &str, value: Value) -> Option<T> {
            serde_json::from_value(value)
                .map_err(|e| tracing::warn!(key, "Ignoring malformed setting: {e}"))
                .ok()
        }

        match key {
            PRINTER_SETTINGS_KEY => {
                self.printer_settings = value;
                true
            }
            CATEGORY_CONFIGS_KEY => parse(key, value)
                .map(|v| self.category_configs = v)
                .is_some(),
            LOYALTY_SETTINGS_KEY => parse(key, value)
                .map(|v| self.loyalty_settings = v)
                .is_some(),
            EXPENSE_CATEGORIES_KEY => parse(key, value)
                .map(|v| self.expense_categories = v)
                .is_some(),
            MENU_OPTIONS_KEY => parse(key, value).map(|v| self.menu_options = v).is_some(),
            _ => false,
        }
    }

    /// 单个配置块的 JSON 形式
    pub fn value_of(&self, key: &str) -> Option<Value> {
        match key {
            PRINTER_SETTINGS_KEY => Some(self.printer_settings.clone()),
            CATEGORY_CONFIGS_KEY => serde_json::to_value(&self.category_configs).ok(),
            LOYALTY_SETTINGS_KEY => serde_json::to_value(&self.loyalty_settings).ok(),
            EXPENSE_CATEGORIES_KEY => serde_json::to_value(&self.expense_categories).ok(),
            MENU_OPTIONS_KEY => serde_json::to_value(&self.menu_options).ok(),
            _ => None,
        }
    }
}
