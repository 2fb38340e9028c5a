//! redb-backed local mirror
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `mirror` | `offline_<table>` | JSON array of documents | last known snapshot of an entity table |
//! | `mirror` | `offline_<setting>` | JSON value | last known setting value |
//! | `mirror` | `session` | JSON `User` | persisted login |
//!
//! Every write is its own transaction; redb commits are durable once
//! `commit()` returns.

use redb::{Database, ReadableDatabase, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// key = mirror key, value = JSON bytes
const MIRROR_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("mirror");

const OFFLINE_PREFIX: &str = "offline_";
const SESSION_KEY: &str = "session";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::AppError {
    fn from(err: StorageError) -> Self {
        shared::AppError::storage(err.to_string())
    }
}

fn offline_key(name: &str) -> String {
    format!("{OFFLINE_PREFIX}{name}")
}

/// Local keyed store backed by redb
#[derive(Clone)]
pub struct LocalMirror {
    db: Arc<Database>,
}

impl LocalMirror {
    /// Open or create the mirror at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Database::create(path)?)
    }

    /// Open an in-memory mirror (nothing survives the process)
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?,
        )
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(MIRROR_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    // ========== Raw access ==========

    fn get_raw<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MIRROR_TABLE)?;
        match table.get(key)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn put_raw<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MIRROR_TABLE)?;
            table.insert(key, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MIRROR_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Entity tables ==========

    /// 读取镜像中的整张表；从未写入过返回 None
    pub fn read_table(&self, table: &str) -> StorageResult<Option<Vec<Value>>> {
        self.get_raw(&offline_key(table))
    }

    pub fn write_table(&self, table: &str, items: &[Value]) -> StorageResult<()> {
        self.put_raw(&offline_key(table), items)
    }

    // ========== Settings ==========

    pub fn read_setting(&self, key: &str) -> StorageResult<Option<Value>> {
        self.get_raw(&offline_key(key))
    }

    pub fn write_setting(&self, key: &str, value: &Value) -> StorageResult<()> {
        self.put_raw(&offline_key(key), value)
    }

    // ========== Session ==========

    pub fn read_session(&self) -> StorageResult<Option<Value>> {
        self.get_raw(SESSION_KEY)
    }

    pub fn write_session<T: Serialize>(&self, user: &T) -> StorageResult<()> {
        self.put_raw(SESSION_KEY, user)
    }

    pub fn clear_session(&self) -> StorageResult<()> {
        self.remove_raw(SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_roundtrip() {
        let mirror = LocalMirror::open_in_memory().unwrap();
        assert!(mirror.read_table("orders").unwrap().is_none());

        let rows = vec![json!({ "id": "ord-1" }), json!({ "id": "ord-2" })];
        mirror.write_table("orders", &rows).unwrap();
        assert_eq!(mirror.read_table("orders").unwrap().unwrap(), rows);

        mirror.write_table("orders", &[]).unwrap();
        assert_eq!(mirror.read_table("orders").unwrap().unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn test_setting_and_table_share_prefix() {
        let mirror = LocalMirror::open_in_memory().unwrap();
        mirror
            .write_setting("loyalty_settings", &json!({ "enabled": true }))
            .unwrap();
        assert_eq!(
            mirror.read_setting("loyalty_settings").unwrap().unwrap()["enabled"],
            true
        );
        assert!(mirror.read_table("loyalty_settings").is_err());
    }

    #[test]
    fn test_session_lifecycle() {
        let mirror = LocalMirror::open_in_memory().unwrap();
        mirror.write_session(&json!({ "id": "u-1", "name": "Ana" })).unwrap();
        assert_eq!(mirror.read_session().unwrap().unwrap()["name"], "Ana");
        mirror.clear_session().unwrap();
        assert!(mirror.read_session().unwrap().is_none());
    }

    #[test]
    fn test_file_backed_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mirror.redb");
        {
            let mirror = LocalMirror::open(&path).unwrap();
            mirror.write_table("zones", &[json!({ "id": "z-1" })]).unwrap();
        }
        let mirror = LocalMirror::open(&path).unwrap();
        assert_eq!(mirror.read_table("zones").unwrap().unwrap().len(), 1);
    }
}
