// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Durable key/value storage backing the credential cache.
//!
//! Two backends: [`MemoryStorage`] for tests and throwaway sessions, and
//! [`SqliteStorage`] which keeps values in the `settings` table of the local
//! database so they survive process restarts.

use crate::error::StorageError;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

/// Synchronous string storage. Writes must be durable when the call returns.
pub trait DurableStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self
            .items
            .read()
            .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;
        items.remove(key);
        Ok(())
    }
}

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = crate::db::open_or_init(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Wrap an existing connection, creating the `settings` table if needed.
    pub fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        crate::db::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StorageError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("Lock poisoned: {}", e)))?;
        Ok(f(&conn)?)
    }
}

impl DurableStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key=?1",
                params![key],
                |r| r.get(0),
            )
            .optional()
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO settings(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=datetime('now')",
                params![key, value],
            )
            .map(|_| ())
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM settings WHERE key=?1", params![key])
                .map(|_| ())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_storage_upserts_and_removes() {
        let storage = SqliteStorage::from_connection(Connection::open_in_memory().unwrap()).unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
        storage.set_item("k", "one").unwrap();
        storage.set_item("k", "two").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("two"));
        storage.remove_item("k").unwrap();
        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }
}
