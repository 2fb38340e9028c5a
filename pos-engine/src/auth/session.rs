//! 登录与会话

use shared::models::{Capability, SiteScope, User};
use shared::{AppError, AppResult};

use super::SUPPORT_ROLE_ID;
use super::password::verify_password;
use crate::core::PosEngine;

const SUPPORT_USER_ID: &str = "support";
const SUPPORT_DISPLAY_NAME: &str = "Soporte Técnico";

impl PosEngine {
    /// 用户名密码登录
    ///
    /// 成功后门店上下文切换到用户所属门店，会话写入本地镜像。
    pub fn login(&self, username: &str, password: &str) -> AppResult<User> {
        let username = username.trim();

        let user = match self.support_login(username, password) {
            Some(user) => user,
            None => {
                let candidate = self
                    .state()
                    .read()
                    .data
                    .users
                    .iter()
                    .find(|u| u.username.eq_ignore_ascii_case(username))
                    .cloned();
                let Some(candidate) = candidate else {
                    tracing::warn!(target: "security", username, "Login failed: unknown user");
                    return Err(self.notices().reject(AppError::invalid_credentials()));
                };
                let valid = verify_password(&candidate.password_hash, password).unwrap_or_else(|e| {
                    tracing::error!(user_id = %candidate.id, error = %e, "Stored password hash is unusable");
                    false
                });
                if !valid {
                    tracing::warn!(target: "security", username, "Login failed: wrong password");
                    return Err(self.notices().reject(AppError::invalid_credentials()));
                }
                candidate.session_copy()
            }
        };

        self.start_session(user.clone());
        if let Err(e) = self.gateway().mirror().write_session(&user) {
            tracing::error!(error = %e, "Persisting session failed");
        }
        tracing::info!(target: "security", user_id = %user.id, role_id = %user.role_id, "Login");
        self.notices().success(format!("Bienvenido, {}", user.name));
        Ok(user)
    }

    /// 技术支持账号：仅在配置了用户名和 argon2 哈希时启用
    fn support_login(&self, username: &str, password: &str) -> Option<User> {
        let (support_username, support_hash) = self.config().support_credentials()?;
        if support_username != username {
            return None;
        }
        match verify_password(support_hash, password) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                tracing::error!(error = %e, "SUPPORT_PASSWORD_HASH is not a valid argon2 hash");
                return None;
            }
        }
        let site_id = self
            .state()
            .scope()
            .site_id()
            .map(str::to_string)
            .unwrap_or_else(|| self.config().default_site_id.clone());
        Some(User {
            id: SUPPORT_USER_ID.into(),
            username: username.into(),
            name: SUPPORT_DISPLAY_NAME.into(),
            password_hash: String::new(),
            role_id: SUPPORT_ROLE_ID.into(),
            site_id,
        })
    }

    fn start_session(&self, user: User) {
        let mut state = self.state().write();
        state.scope = SiteScope::from_id(&user.site_id);
        state.session = Some(user);
    }

    /// 从本地镜像恢复会话；内容无效时清除
    pub fn restore_session(&self) -> Option<User> {
        let raw = match self.gateway().mirror().read_session() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(error = %e, "Reading stored session failed");
                return None;
            }
        };

        match serde_json::from_value::<User>(raw) {
            Ok(user) if user.is_valid_session() => {
                tracing::info!(user_id = %user.id, "Session restored");
                self.start_session(user.clone());
                Some(user)
            }
            Ok(_) | Err(_) => {
                tracing::warn!("Stored session is invalid, clearing");
                if let Err(e) = self.gateway().mirror().clear_session() {
                    tracing::error!(error = %e, "Clearing stored session failed");
                }
                None
            }
        }
    }

    pub fn logout(&self) {
        let previous = self.state().write().session.take();
        if let Err(e) = self.gateway().mirror().clear_session() {
            tracing::error!(error = %e, "Clearing stored session failed");
        }
        if let Some(user) = previous {
            tracing::info!(target: "security", user_id = %user.id, "Logout");
        }
    }

    pub fn current_user(&self) -> AppResult<User> {
        self.state()
            .session()
            .ok_or_else(|| self.notices().reject(AppError::not_authenticated()))
    }

    /// 当前用户的角色是否授予该权限；技术支持账号拥有全部权限
    pub fn can(&self, capability: Capability) -> bool {
        let state = self.state().read();
        let Some(user) = &state.session else {
            return false;
        };
        if user.role_id == SUPPORT_ROLE_ID {
            return true;
        }
        state.role(&user.role_id).is_some_and(|role| role.grants(capability))
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::hash_password;
    use crate::core::Config;
    use crate::db::LocalMirror;
    use crate::test_support::{create_user, offline_engine};
    use crate::PosEngine;
    use shared::ErrorCode;
    use shared::models::{Capability, SiteScope};

    #[tokio::test]
    async fn test_login_and_capabilities() {
        let engine = offline_engine();
        engine.refresh().await;
        create_user(&engine, "caja", "1234", "role-cajero").await;

        let err = engine.login("caja", "wrong").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        assert!(!engine.can(Capability::Pos));

        let user = engine.login("CAJA", "1234").unwrap();
        assert!(user.password_hash.is_empty());
        assert!(engine.can(Capability::Pos));
        assert!(!engine.can(Capability::Settings));
        assert_eq!(engine.state().scope(), SiteScope::Site("sede-principal".into()));

        engine.logout();
        assert!(engine.state().session().is_none());
        assert!(engine.restore_session().is_none());
    }

    #[tokio::test]
    async fn test_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.redb");
        {
            let engine = PosEngine::with_parts(
                Config::offline(dir.path().to_string_lossy().to_string()),
                None,
                LocalMirror::open(&path).unwrap(),
            );
            engine.refresh().await;
            create_user(&engine, "mesero", "1111", "role-mesero").await;
            engine.login("mesero", "1111").unwrap();
        }

        let engine = PosEngine::with_parts(
            Config::offline(dir.path().to_string_lossy().to_string()),
            None,
            LocalMirror::open(&path).unwrap(),
        );
        let restored = engine.restore_session().unwrap();
        assert_eq!(restored.username, "mesero");
        assert!(restored.password_hash.is_empty());
    }

    #[test]
    fn test_invalid_stored_session_is_cleared() {
        let engine = offline_engine();
        engine
            .gateway()
            .mirror()
            .write_session(&serde_json::json!({ "id": "", "name": "x" }))
            .unwrap();
        assert!(engine.restore_session().is_none());
        assert!(engine.gateway().mirror().read_session().unwrap().is_none());
    }

    #[test]
    fn test_support_login_requires_configuration() {
        let mut config = Config::offline("/tmp/pos-support");
        let engine = PosEngine::with_parts(config.clone(), None, LocalMirror::open_in_memory().unwrap());
        assert!(engine.login("soporte", "secreto").is_err());

        config.support_username = Some("soporte".into());
        config.support_password_hash = Some(hash_password("secreto").unwrap());
        let engine = PosEngine::with_parts(config, None, LocalMirror::open_in_memory().unwrap());
        let user = engine.login("soporte", "secreto").unwrap();
        assert_eq!(user.role_id, crate::auth::SUPPORT_ROLE_ID);
        assert!(engine.can(Capability::Settings));
        assert!(engine.login("soporte", "otro").is_err());
    }
}
