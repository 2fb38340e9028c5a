//! Order lifecycle types
//!
//! - [`Order`]: the stored order document with its channel binding
//! - [`OrderItem`]: a line snapshotted from a menu item
//! - [`Sale`]: the immutable record written when an order is paid
//! - [`ParsedOrder`]: structured output of the external order parser

pub mod item;
pub mod parsed;
pub mod sale;
pub mod snapshot;
pub mod types;

// Re-exports
pub use item::{ItemOptions, OrderItem, OrderItemPatch};
pub use parsed::{ParsedCustomer, ParsedOrder, ParsedOrderItem};
pub use sale::Sale;
pub use snapshot::{CustomerContact, Order};
pub use types::*;
