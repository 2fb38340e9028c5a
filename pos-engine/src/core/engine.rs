//! PosEngine — 引擎入口
//!
//! 持有配置、共享状态、持久化网关和提示总线。各业务操作分布在
//! `orders`、`tables`、`admin`、`auth` 模块的 `impl PosEngine` 中。

use shared::models::{Capability, SiteScope};
use shared::{AppError, AppResult, ErrorCode, Notice};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::config::Config;
use super::state::{AppState, ApplyReport};
use crate::db::{Gateway, HttpRemoteStore, LocalMirror, RemoteStore};
use crate::notice::NoticeBus;
use crate::sync::{self, Reconciler};

pub struct PosEngine {
    config: Config,
    state: AppState,
    gateway: Arc<Gateway>,
    notices: NoticeBus,
}

impl PosEngine {
    /// 按配置打开本地镜像并连接远端
    ///
    /// 远端未配置时离线运行。
    pub fn initialize(config: Config) -> AppResult<Self> {
        let mirror = LocalMirror::open(config.mirror_path())?;
        let remote: Option<Arc<dyn RemoteStore>> = match config.remote() {
            Some(settings) => {
                let store = HttpRemoteStore::new(&settings, config.request_timeout())?;
                tracing::info!(url = %settings.url, "Remote store configured");
                Some(Arc::new(store))
            }
            None => None,
        };
        Ok(Self::with_parts(config, remote, mirror))
    }

    /// 用给定的远端和镜像组装引擎
    pub fn with_parts(
        config: Config,
        remote: Option<Arc<dyn RemoteStore>>,
        mirror: LocalMirror,
    ) -> Self {
        let notices = NoticeBus::new();
        let gateway = Arc::new(Gateway::new(remote, mirror, notices.clone()));
        let state = AppState::new(&config.default_site_id);
        Self {
            config,
            state,
            gateway,
            notices,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn is_offline(&self) -> bool {
        self.gateway.is_offline()
    }

    /// 全量拉取一次并覆盖本地状态
    pub async fn refresh(&self) -> ApplyReport {
        sync::reconcile_once(&self.gateway, &self.state).await
    }

    /// 后台对账 worker
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(
            self.gateway.clone(),
            self.state.clone(),
            self.config.reconcile_interval(),
            self.config.reconcile_debounce(),
        )
    }

    /// 当前具体门店；全局视图下拒绝并提示
    pub(crate) fn require_site(&self) -> AppResult<String> {
        match self.state.scope() {
            SiteScope::Site(id) => Ok(id),
            SiteScope::Global => Err(self.notices.reject(AppError::new(ErrorCode::SiteNotSelected))),
        }
    }

    /// 当前用户必须拥有该权限
    pub(crate) fn require(&self, capability: Capability) -> AppResult<()> {
        if self.can(capability) {
            return Ok(());
        }
        let err = if self.state.session().is_none() {
            AppError::not_authenticated()
        } else {
            AppError::permission_denied(format!(
                "Se requiere el permiso {}",
                capability.as_str()
            ))
        };
        Err(self.notices.reject(err))
    }
}
