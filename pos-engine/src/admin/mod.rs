//! 管理操作
//!
//! 门店、员工、角色和配置的维护。除门店上下文切换外都需要
//! `SETTINGS` 权限；系统里还没有任何用户时 (首次引导) 放行，
//! 以便创建第一个管理员。

mod settings;
mod sites;
mod staff;

pub use staff::UserInput;

use shared::AppResult;
use shared::models::{Capability, MenuItem, Role, Site};

use crate::core::PosEngine;
use crate::db::defaults::default_rows;
use crate::db::gateway::decode_rows;
use crate::db::tables;

impl PosEngine {
    pub(crate) fn require_admin(&self) -> AppResult<()> {
        if self.state().read().data.users.is_empty() {
            tracing::debug!("No users yet, allowing bootstrap admin operation");
            return Ok(());
        }
        self.require(Capability::Settings)
    }

    /// 远端表为空时写入内置的角色、门店和菜单
    ///
    /// 返回被写入的表名。离线时不做任何事。
    pub async fn seed_remote_defaults(&self) -> Vec<&'static str> {
        let mut seeded = Vec::new();
        let roles: Vec<Role> = decode_rows(default_rows(tables::ROLES));
        if self.gateway().seed_table(&roles).await {
            seeded.push(tables::ROLES);
        }
        let sites: Vec<Site> = decode_rows(default_rows(tables::SEDES));
        if self.gateway().seed_table(&sites).await {
            seeded.push(tables::SEDES);
        }
        let menu: Vec<MenuItem> = decode_rows(default_rows(tables::MENU_ITEMS));
        if self.gateway().seed_table(&menu).await {
            seeded.push(tables::MENU_ITEMS);
        }
        if !seeded.is_empty() {
            tracing::info!(?seeded, "Seeded remote defaults");
        }
        seeded
    }
}
