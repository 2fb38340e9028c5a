//! Site (Sede) Model

use serde::{Deserialize, Serialize};

/// 跨门店汇总视图的哨兵 ID，只读，不能录入营业数据
pub const GLOBAL_SITE_ID: &str = "global";

/// Site entity (门店)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// 当前操作的门店上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteScope {
    /// 所有门店汇总 (只读)
    Global,
    /// 具体门店
    Site(String),
}

impl SiteScope {
    pub fn from_id(id: &str) -> Self {
        if id == GLOBAL_SITE_ID {
            Self::Global
        } else {
            Self::Site(id.to_string())
        }
    }

    /// 具体门店 ID；全局视图返回 None
    pub fn site_id(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Site(id) => Some(id),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Global => GLOBAL_SITE_ID,
            Self::Site(id) => id,
        }
    }

    /// 全局视图包含所有门店
    pub fn includes(&self, site_id: &str) -> bool {
        match self {
            Self::Global => true,
            Self::Site(id) => id == site_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_id() {
        assert_eq!(SiteScope::from_id("global"), SiteScope::Global);
        let scope = SiteScope::from_id("sede-principal");
        assert_eq!(scope.site_id(), Some("sede-principal"));
        assert!(scope.includes("sede-principal"));
        assert!(!scope.includes("sede-norte"));
        assert!(SiteScope::Global.includes("sede-norte"));
        assert_eq!(SiteScope::Global.site_id(), None);
    }
}
