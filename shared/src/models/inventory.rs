//! Inventory Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 按件计量的单位：无配方菜品按名称匹配时只认这个单位
pub const UNIT_EACH: &str = "unidad";

/// Inventory item entity (库存)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub stock: Decimal,
    pub unit: String,
    #[serde(default)]
    pub cost: Decimal,
    #[serde(default)]
    pub alert_threshold: Decimal,
    #[serde(rename = "sedeId")]
    pub site_id: String,
}

impl InventoryItem {
    /// 扣减库存，下限为 0；返回实际扣减量
    pub fn deduct(&mut self, quantity: Decimal) -> Decimal {
        let before = self.stock;
        self.stock = (self.stock - quantity).max(Decimal::ZERO);
        before - self.stock
    }

    /// 手动调整库存 (正数入库，负数出库)，下限为 0
    pub fn adjust(&mut self, delta: Decimal) {
        self.stock = (self.stock + delta).max(Decimal::ZERO);
    }

    pub fn is_low(&self) -> bool {
        self.stock <= self.alert_threshold
    }

    /// 按件计量且名称匹配 (忽略大小写)
    pub fn matches_unit_name(&self, name: &str) -> bool {
        self.unit.eq_ignore_ascii_case(UNIT_EACH) && self.name.to_lowercase() == name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(stock: i64) -> InventoryItem {
        InventoryItem {
            id: "inv-1".into(),
            name: "Pan".into(),
            stock: Decimal::from(stock),
            unit: "unidad".into(),
            cost: Decimal::from(500),
            alert_threshold: Decimal::from(5),
            site_id: "sede-principal".into(),
        }
    }

    #[test]
    fn test_deduct_clamps_at_zero() {
        let mut inv = item(4);
        let taken = inv.deduct(Decimal::from(6));
        assert_eq!(inv.stock, Decimal::ZERO);
        assert_eq!(taken, Decimal::from(4));
    }

    #[test]
    fn test_adjust_and_low() {
        let mut inv = item(10);
        inv.adjust(Decimal::from(-7));
        assert_eq!(inv.stock, Decimal::from(3));
        assert!(inv.is_low());
        inv.adjust(Decimal::from(-100));
        assert_eq!(inv.stock, Decimal::ZERO);
    }

    #[test]
    fn test_matches_unit_name_case_insensitive() {
        let inv = item(1);
        assert!(inv.matches_unit_name("PAN"));
        assert!(!inv.matches_unit_name("Pan integral"));
        let mut kilos = item(1);
        kilos.unit = "kg".into();
        assert!(!kilos.matches_unit_name("pan"));
    }
}
