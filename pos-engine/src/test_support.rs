//! 单元测试共用的引擎构造

use shared::models::User;
use std::sync::Arc;

use crate::auth::hash_password;
use crate::core::{Config, PosEngine};
use crate::db::{LocalMirror, MemoryRemoteStore, RemoteStore};

pub fn offline_engine() -> PosEngine {
    PosEngine::with_parts(
        Config::offline("/tmp/pos-engine-test"),
        None,
        LocalMirror::open_in_memory().unwrap(),
    )
}

pub fn online_engine() -> (PosEngine, Arc<MemoryRemoteStore>) {
    let remote = Arc::new(MemoryRemoteStore::new());
    let engine = PosEngine::with_parts(
        Config::offline("/tmp/pos-engine-test"),
        Some(remote.clone() as Arc<dyn RemoteStore>),
        LocalMirror::open_in_memory().unwrap(),
    );
    (engine, remote)
}

/// 直接放入一个员工 (绕过管理权限检查)
pub async fn create_user(engine: &PosEngine, username: &str, password: &str, role_id: &str) -> User {
    let user = User {
        id: format!("user-{username}"),
        username: username.to_string(),
        name: username.to_string(),
        password_hash: hash_password(password).unwrap(),
        role_id: role_id.to_string(),
        site_id: "sede-principal".to_string(),
    };
    engine.state().write().data.users.push(user.clone());
    engine.gateway().insert(&user).await;
    user
}
