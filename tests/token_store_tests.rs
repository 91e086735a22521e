// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetdash::storage::{DurableStorage, MemoryStorage, SqliteStorage};
use budgetdash::token_store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TokenStore};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn hydrates_from_storage_on_first_read() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(ACCESS_TOKEN_KEY, "persisted").unwrap();
    let tokens = TokenStore::new(storage);
    assert!(tokens.is_authenticated());
    assert_eq!(tokens.get().as_deref(), Some("persisted"));
    assert_eq!(tokens.refresh(), None);
}

#[test]
fn set_and_clear_mirror_into_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let tokens = TokenStore::new(Arc::clone(&storage) as Arc<dyn DurableStorage>);

    tokens.set("a1", Some("r1"));
    assert_eq!(storage.get_item(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("a1"));
    assert_eq!(storage.get_item(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("r1"));

    tokens.set("a2", None);
    assert_eq!(tokens.refresh(), None);
    assert_eq!(storage.get_item(REFRESH_TOKEN_KEY).unwrap(), None);

    tokens.clear();
    tokens.clear();
    assert!(!tokens.is_authenticated());
    assert_eq!(storage.get_item(ACCESS_TOKEN_KEY).unwrap(), None);
}

#[test]
fn sqlite_credentials_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("budgetdash.sqlite");
    {
        let storage = Arc::new(SqliteStorage::open(&path).unwrap());
        TokenStore::new(storage).set("durable", Some("refresh"));
    }
    let reopened = TokenStore::new(Arc::new(SqliteStorage::open(&path).unwrap()));
    assert_eq!(reopened.get().as_deref(), Some("durable"));
    assert_eq!(reopened.refresh().as_deref(), Some("refresh"));

    reopened.clear();
    let again = TokenStore::new(Arc::new(SqliteStorage::open(&path).unwrap()));
    assert_eq!(again.get(), None);
}

#[test]
fn data_dir_override_is_created() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let db = budgetdash::db::db_path(Some(&nested)).unwrap();
    assert!(nested.is_dir());
    assert_eq!(db, nested.join(budgetdash::db::DB_FILE));
}
