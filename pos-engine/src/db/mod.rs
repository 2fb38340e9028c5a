//! Persistence layer
//!
//! - [`RemoteStore`]: remote seam ([`HttpRemoteStore`], [`MemoryRemoteStore`])
//! - [`LocalMirror`]: redb keyed store used as offline fallback
//! - [`Gateway`]: CRUD / bulk / subscribe with automatic mirroring

pub mod defaults;
pub mod gateway;
pub mod http;
pub mod local;
pub mod memory;
pub mod record;
pub mod remote;
pub mod tables;

pub use gateway::{DataSnapshot, Gateway, OFFLINE_NOTICE, Subscription};
pub use http::HttpRemoteStore;
pub use local::{LocalMirror, StorageError, StorageResult};
pub use memory::MemoryRemoteStore;
pub use record::Record;
pub use remote::{RemoteRow, RemoteStore, SettingRow, TransportError, TransportResult};
