// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::storage::DurableStorage;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Debug, Default)]
struct Cache {
    hydrated: bool,
    access: Option<String>,
    refresh: Option<String>,
}

/// In-memory credential cache mirrored into durable storage.
///
/// The in-memory copy is authoritative for the running process. A storage
/// write failure is logged and the cache still changes, so a broken disk can
/// never leave the process believing it is signed in after `clear`.
pub struct TokenStore {
    storage: Arc<dyn DurableStorage>,
    cache: Mutex<Cache>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        Self {
            storage,
            cache: Mutex::new(Cache::default()),
        }
    }

    /// Current access token, hydrating from storage on first use.
    pub fn get(&self) -> Option<String> {
        self.hydrated().access.clone()
    }

    pub fn refresh(&self) -> Option<String> {
        self.hydrated().refresh.clone()
    }

    pub fn set(&self, access: &str, refresh: Option<&str>) {
        let mut cache = self.lock();
        if let Err(e) = self.storage.set_item(ACCESS_TOKEN_KEY, access) {
            warn!(error = %e, "failed to persist access token");
        }
        let refresh_result = match refresh {
            Some(r) => self.storage.set_item(REFRESH_TOKEN_KEY, r),
            None => self.storage.remove_item(REFRESH_TOKEN_KEY),
        };
        if let Err(e) = refresh_result {
            warn!(error = %e, "failed to persist refresh token");
        }
        cache.access = Some(access.to_string()).filter(|s| !s.is_empty());
        cache.refresh = refresh.map(str::to_string);
        cache.hydrated = true;
        debug!("credential stored");
    }

    pub fn clear(&self) {
        let mut cache = self.lock();
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                warn!(error = %e, key, "failed to remove token from storage");
            }
        }
        cache.access = None;
        cache.refresh = None;
        cache.hydrated = true;
        debug!("credential cleared");
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn hydrated(&self) -> MutexGuard<'_, Cache> {
        let mut cache = self.lock();
        if !cache.hydrated {
            cache.access = self.read_key(ACCESS_TOKEN_KEY);
            cache.refresh = self.read_key(REFRESH_TOKEN_KEY);
            cache.hydrated = true;
        }
        cache
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(v) => v.filter(|s| !s.is_empty()),
            Err(e) => {
                warn!(error = %e, key, "failed to read token from storage");
                None
            }
        }
    }
}
