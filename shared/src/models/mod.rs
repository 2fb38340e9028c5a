//! Data models
//!
//! Entities stored in the remote `{ id, data }` rows and in the local mirror.
//! JSON is camelCase; site scope is serialized as `sedeId`.

pub mod customer;
pub mod delivery_rate;
pub mod dining_table;
pub mod expense;
pub mod inventory;
pub mod menu_item;
pub mod role;
pub mod settings;
pub mod site;
pub mod user;
pub mod zone;

// Re-exports
pub use customer::*;
pub use delivery_rate::*;
pub use dining_table::*;
pub use expense::*;
pub use inventory::*;
pub use menu_item::*;
pub use role::*;
pub use settings::*;
pub use site::*;
pub use user::*;
pub use zone::*;
