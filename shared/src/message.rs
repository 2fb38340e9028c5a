//! Change notifications and user notices
//!
//! - [`RowChange`]: a row changed in a remote table (drives reconciliation)
//! - [`Notice`]: a short user-facing message (success / info / error)

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 订阅白名单中的通配符
pub const ALL_TABLES: &str = "*";

/// 行变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

/// 远端表的行变更通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowChange {
    pub table: String,
    pub action: ChangeAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl RowChange {
    pub fn new(table: impl Into<String>, action: ChangeAction, id: Option<String>) -> Self {
        Self {
            table: table.into(),
            action,
            id,
        }
    }

    /// 是否命中订阅白名单 (`*` 匹配所有表)
    pub fn matches(&self, tables: &[String]) -> bool {
        tables
            .iter()
            .any(|t| t == ALL_TABLES || *t == self.table)
    }
}

impl fmt::Display for RowChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.action, self.table)?;
        if let Some(id) = &self.id {
            write!(f, "/{}", id)?;
        }
        Ok(())
    }
}

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// 用户可见的提示消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            code: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            code: None,
        }
    }
}

impl From<&AppError> for Notice {
    fn from(err: &AppError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: err.message.clone(),
            code: Some(err.code),
        }
    }
}
