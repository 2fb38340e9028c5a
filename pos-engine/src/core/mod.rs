//! 核心模块 - 配置、状态、引擎入口和后台任务
//!
//! - [`Config`] - 引擎配置
//! - [`AppState`] - 共享应用状态
//! - [`PosEngine`] - 引擎入口
//! - [`BackgroundTasks`] - 后台任务管理

pub mod config;
pub mod engine;
pub mod state;
pub mod tasks;

pub use config::{Config, RemoteSettings};
pub use engine::PosEngine;
pub use state::{AppState, ApplyReport, Collections, StateInner};
pub use tasks::{BackgroundTasks, TaskKind};
