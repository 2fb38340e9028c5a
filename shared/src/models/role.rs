//! Role Model

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// 功能权限
///
/// 每个视图/操作组一个变体；角色持有授予的集合，检查即集合成员判断。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    Dashboard,
    Pos,
    Tables,
    Menu,
    Inventory,
    Delivery,
    Customers,
    Loyalty,
    Reports,
    Expenses,
    Kitchen,
    Settings,
}

impl Capability {
    pub const ALL: [Capability; 12] = [
        Capability::Dashboard,
        Capability::Pos,
        Capability::Tables,
        Capability::Menu,
        Capability::Inventory,
        Capability::Delivery,
        Capability::Customers,
        Capability::Loyalty,
        Capability::Reports,
        Capability::Expenses,
        Capability::Kitchen,
        Capability::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "DASHBOARD",
            Self::Pos => "POS",
            Self::Tables => "TABLES",
            Self::Menu => "MENU",
            Self::Inventory => "INVENTORY",
            Self::Delivery => "DELIVERY",
            Self::Customers => "CUSTOMERS",
            Self::Loyalty => "LOYALTY",
            Self::Reports => "REPORTS",
            Self::Expenses => "EXPENSES",
            Self::Kitchen => "KITCHEN",
            Self::Settings => "SETTINGS",
        }
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown capability: {}", s))
    }
}

/// Role entity (RBAC 角色)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    /// 远端存的是字符串数组；未知值在反序列化时丢弃
    #[serde(rename = "permissions", deserialize_with = "lenient_capabilities")]
    pub capabilities: BTreeSet<Capability>,
}

impl Role {
    pub fn grants(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

fn lenient_capabilities<'de, D>(deserializer: D) -> Result<BTreeSet<Capability>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw
        .iter()
        .filter_map(|s| match s.parse::<Capability>() {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::debug!("Dropping role permission: {e}");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_grants() {
        let role = Role {
            id: "role-cajero".into(),
            name: "Cajero".into(),
            capabilities: [Capability::Pos, Capability::Tables].into_iter().collect(),
        };
        assert!(role.grants(Capability::Pos));
        assert!(!role.grants(Capability::Settings));
    }

    #[test]
    fn test_unknown_permissions_are_dropped() {
        let json = r#"{"id":"r1","name":"Mesero","permissions":["POS","WHATSAPP","TABLES"]}"#;
        let role: Role = serde_json::from_str(json).unwrap();
        assert_eq!(role.capabilities.len(), 2);
        assert!(role.grants(Capability::Tables));
    }

    #[test]
    fn test_serialize_as_strings() {
        let role = Role {
            id: "r1".into(),
            name: "Cocina".into(),
            capabilities: [Capability::Kitchen].into_iter().collect(),
        };
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["permissions"], serde_json::json!(["KITCHEN"]));
    }
}
