//! POS Engine - 餐厅收银订单生命周期与本地状态同步引擎
//!
//! # 架构概述
//!
//! - **持久化网关** (`db`): 远端 REST 存储 + redb 本地镜像，远端不可用时离线运行
//! - **应用状态** (`core::state`): 所有实体集合、配置、门店上下文、会话
//! - **订单** (`orders`): 草稿编辑、保存、状态流转、结账
//! - **桌台** (`tables`): 订单驱动的占用状态、桌台/区域管理
//! - **库存 / 会员** (`inventory`, `loyalty`): 结账时的扣减和积分
//! - **认证** (`auth`): argon2 登录、会话恢复、角色权限
//! - **对账** (`sync`): 远端快照定期/按通知覆盖本地状态
//!
//! # 模块结构
//!
//! ```text
//! pos-engine/src/
//! ├── core/          # 配置、状态、引擎入口、后台任务
//! ├── db/            # 远端、本地镜像、网关
//! ├── orders/        # 订单草稿、保存、结账
//! ├── tables/        # 桌台占用、桌台/区域管理
//! ├── admin/         # 门店、员工、角色、配置
//! ├── auth/          # 密码、会话、权限
//! ├── sync/          # 对账 worker
//! └── utils/         # 日志
//! ```

pub mod admin;
pub mod auth;
pub mod core;
pub mod db;
pub mod inventory;
pub mod loyalty;
pub mod notice;
pub mod orders;
pub mod sync;
pub mod tables;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export 公共类型
pub use core::{AppState, BackgroundTasks, Config, PosEngine, TaskKind};
pub use db::{Gateway, LocalMirror, MemoryRemoteStore, RemoteStore};
pub use notice::NoticeBus;
pub use orders::{AddOutcome, OrderDraft};
pub use sync::Reconciler;
pub use shared::{AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::{init_logger, init_logger_with_file};

/// 加载 .env 并初始化日志
pub fn setup_environment() -> Config {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    if !dotenv_loaded {
        tracing::debug!("No .env file found, using process environment");
    }
    config
}
