//! 订单
//!
//! - [`OrderDraft`]: 正在编辑的订单，纯同步操作
//! - [`validate_options`]: 可选项校验
//! - `service`: 保存、状态流转
//! - `checkout`: 结账生成销售记录

mod checkout;
pub mod draft;
pub mod options;
mod service;

pub use checkout::SALE_COMPLETED_NOTICE;
pub use draft::{AddOutcome, OrderDraft, QUICK_SALE_NAME};
pub use options::{DEFAULT_MAX_CHOICES, validate_options};
pub use service::ORDER_SAVED_NOTICE;
