//! 认证与权限
//!
//! - [`password`]: argon2 哈希
//! - `session`: 登录、会话恢复、权限判断
//!
//! 权限模型：每个角色持有 [`Capability`](shared::models::Capability) 集合，
//! 检查即集合成员判断。

pub mod password;
mod session;

pub use password::{hash_password, verify_password};

/// 技术支持账号的虚拟角色 (拥有全部权限，不存储)
pub const SUPPORT_ROLE_ID: &str = "role-support";
