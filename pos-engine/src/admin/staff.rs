//! 员工与角色

use serde::{Deserialize, Serialize};
use shared::models::{Role, User};
use shared::util::generate_id;
use shared::{AppError, AppResult, ErrorCode};

use crate::auth::hash_password;
use crate::core::PosEngine;
use crate::core::state::upsert_by_id;

/// 创建 / 编辑员工的输入
///
/// `id` 为空表示新建；编辑时 `password` 为空则保留原密码。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub password: Option<String>,
    pub role_id: String,
    #[serde(rename = "sedeId")]
    pub site_id: String,
}

impl PosEngine {
    /// 新建或编辑员工；返回不含密码哈希的副本
    pub async fn save_user(&self, input: UserInput) -> AppResult<User> {
        self.require_admin()?;
        let username = input.username.trim().to_lowercase();
        let name = input.name.trim().to_string();
        if username.is_empty() || name.is_empty() {
            return Err(self
                .notices()
                .reject(AppError::validation("Usuario y nombre son obligatorios")));
        }
        let password = input.password.as_deref().filter(|p| !p.is_empty());

        let existing = {
            let state = self.state().read();
            if state.role(&input.role_id).is_none() {
                return Err(self.notices().reject(AppError::new(ErrorCode::RoleNotFound)));
            }
            if !state.data.sites.iter().any(|s| s.id == input.site_id) {
                return Err(self.notices().reject(AppError::new(ErrorCode::SiteNotFound)));
            }
            let existing = match &input.id {
                Some(id) => match state.data.users.iter().find(|u| &u.id == id) {
                    Some(user) => Some(user.clone()),
                    None => return Err(self.notices().reject(AppError::new(ErrorCode::UserNotFound))),
                },
                None => None,
            };
            let taken = state.data.users.iter().any(|u| {
                u.username.eq_ignore_ascii_case(&username)
                    && Some(u.id.as_str()) != existing.as_ref().map(|e| e.id.as_str())
            });
            if taken {
                return Err(self.notices().reject(AppError::new(ErrorCode::UsernameExists)));
            }
            existing
        };

        let password_hash = match (password, &existing) {
            (Some(password), _) => hash_password(password)?,
            (None, Some(existing)) => existing.password_hash.clone(),
            (None, None) => {
                return Err(self
                    .notices()
                    .reject(AppError::validation("La contraseña es obligatoria")));
            }
        };

        let user = User {
            id: existing
                .as_ref()
                .map(|e| e.id.clone())
                .unwrap_or_else(|| generate_id("user")),
            username,
            name,
            password_hash,
            role_id: input.role_id,
            site_id: input.site_id,
        };

        upsert_by_id(&mut self.state().write().data.users, user.clone());
        if existing.is_some() {
            self.gateway().upsert(&user).await;
        } else {
            self.gateway().insert(&user).await;
        }
        tracing::info!(user_id = %user.id, "User saved");
        Ok(user.session_copy())
    }

    /// 删除员工；最后一个员工不能删除
    pub async fn delete_user(&self, user_id: &str) -> AppResult<()> {
        self.require_admin()?;
        {
            let mut state = self.state().write();
            if !state.data.users.iter().any(|u| u.id == user_id) {
                return Err(self.notices().reject(AppError::new(ErrorCode::UserNotFound)));
            }
            if state.data.users.len() <= 1 {
                return Err(self.notices().reject(AppError::new(ErrorCode::LastUser)));
            }
            state.data.users.retain(|u| u.id != user_id);
        }
        self.gateway().delete::<User>(user_id).await;
        tracing::info!(user_id, "User deleted");
        Ok(())
    }

    /// 新建或编辑角色；`id` 为空时生成
    pub async fn save_role(&self, mut role: Role) -> AppResult<Role> {
        self.require_admin()?;
        role.name = role.name.trim().to_string();
        if role.name.is_empty() {
            return Err(self
                .notices()
                .reject(AppError::validation("El nombre del rol es obligatorio")));
        }
        let is_new = role.id.trim().is_empty();
        if is_new {
            role.id = generate_id("role");
        }
        upsert_by_id(&mut self.state().write().data.roles, role.clone());
        if is_new {
            self.gateway().insert(&role).await;
        } else {
            self.gateway().upsert(&role).await;
        }
        tracing::info!(role_id = %role.id, capabilities = role.capabilities.len(), "Role saved");
        Ok(role)
    }

    /// 删除角色；仍有员工使用或是最后一个角色时拒绝
    pub async fn delete_role(&self, role_id: &str) -> AppResult<()> {
        self.require_admin()?;
        {
            let mut state = self.state().write();
            if state.role(role_id).is_none() {
                return Err(self.notices().reject(AppError::new(ErrorCode::RoleNotFound)));
            }
            if state.data.roles.len() <= 1 {
                return Err(self.notices().reject(AppError::new(ErrorCode::LastRole)));
            }
            let users = state.data.users.iter().filter(|u| u.role_id == role_id).count();
            if users > 0 {
                return Err(self
                    .notices()
                    .reject(AppError::new(ErrorCode::RoleInUse).with_detail("users", users)));
            }
            state.data.roles.retain(|r| r.id != role_id);
        }
        self.gateway().delete::<Role>(role_id).await;
        tracing::info!(role_id, "Role deleted");
        Ok(())
    }
}
