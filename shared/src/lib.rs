//! Shared types for the POS engine
//!
//! Domain models, order lifecycle types, unified error codes and the
//! notification shapes exchanged between the engine and its front-ends.

pub mod error;
pub mod message;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use message::{ChangeAction, Notice, NoticeLevel, RowChange};
