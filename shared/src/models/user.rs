//! User Model

use serde::{Deserialize, Serialize};

/// User entity (员工账号)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    /// Argon2 PHC 字符串；会话副本中为空
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password_hash: String,
    pub role_id: String,
    #[serde(rename = "sedeId")]
    pub site_id: String,
}

impl User {
    /// 写入会话存储的副本 (不含密码哈希)
    pub fn session_copy(&self) -> Self {
        Self {
            password_hash: String::new(),
            ..self.clone()
        }
    }

    /// 会话恢复时的最低校验：必须有 id 和 name
    pub fn is_valid_session(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_copy_strips_hash() {
        let user = User {
            id: "user-1".into(),
            username: "caja1".into(),
            name: "Caja Uno".into(),
            password_hash: "$argon2id$v=19$...".into(),
            role_id: "role-cajero".into(),
            site_id: "sede-principal".into(),
        };
        let copy = user.session_copy();
        assert!(copy.password_hash.is_empty());
        let json = serde_json::to_string(&copy).unwrap();
        assert!(!json.contains("passwordHash"));
        assert!(copy.is_valid_session());
    }
}
