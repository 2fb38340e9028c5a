//! Unified error system
//!
//! This module provides the error handling system shared by every crate:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Site errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu / inventory errors
//! - 7xxx: Table errors
//! - 8xxx: Staff / customer errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::OrderEmpty);
//! assert_eq!(err.code.code(), 4007);
//!
//! let err = AppError::new(ErrorCode::ZoneHasTables).with_detail("zone_id", "zone-1");
//! assert!(err.details.is_some());
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
