//! 门店与门店上下文

use shared::models::{GLOBAL_SITE_ID, Site, SiteScope};
use shared::util::generate_id;
use shared::{AppError, AppResult, ErrorCode};

use crate::core::PosEngine;

impl PosEngine {
    /// 切换门店上下文；`global` 为只读的汇总视图
    pub fn select_site(&self, site_id: &str) -> AppResult<SiteScope> {
        let mut state = self.state().write();
        if site_id != GLOBAL_SITE_ID && !state.data.sites.iter().any(|s| s.id == site_id) {
            return Err(self.notices().reject(AppError::new(ErrorCode::SiteNotFound)));
        }
        state.scope = SiteScope::from_id(site_id);
        tracing::info!(site_id, "Site context selected");
        Ok(state.scope.clone())
    }

    pub async fn add_site(&self, name: &str, address: &str) -> AppResult<Site> {
        self.require_admin()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(self
                .notices()
                .reject(AppError::validation("El nombre de la sede es obligatorio")));
        }
        let site = Site {
            id: generate_id("sede"),
            name: name.to_string(),
            address: address.trim().to_string(),
        };
        self.state().write().data.sites.push(site.clone());
        self.gateway().insert(&site).await;
        tracing::info!(site_id = %site.id, "Site created");
        Ok(site)
    }

    /// 删除门店；最后一个门店不能删除
    ///
    /// 删除的是当前上下文时切换到剩余的第一个门店。
    pub async fn delete_site(&self, site_id: &str) -> AppResult<()> {
        self.require_admin()?;
        {
            let mut state = self.state().write();
            if !state.data.sites.iter().any(|s| s.id == site_id) {
                return Err(self.notices().reject(AppError::new(ErrorCode::SiteNotFound)));
            }
            if state.data.sites.len() <= 1 {
                return Err(self.notices().reject(AppError::new(ErrorCode::LastSite)));
            }
            state.data.sites.retain(|s| s.id != site_id);
            let next = state.data.sites.first().map(|s| s.id.clone());
            if state.scope.site_id() == Some(site_id)
                && let Some(next) = next
            {
                tracing::info!(site_id = %next, "Site context moved after deletion");
                state.scope = SiteScope::Site(next);
            }
        }
        self.gateway().delete::<Site>(site_id).await;
        tracing::info!(site_id, "Site deleted");
        Ok(())
    }
}
