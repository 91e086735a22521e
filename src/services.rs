// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Explicit wiring of the client: storage, transport, gateway, API and stores.

use crate::api::ApiClient;
use crate::app_store::AppStore;
use crate::auth_store::AuthStore;
use crate::config::ClientConfig;
use crate::db;
use crate::gateway::{Gateway, Navigator};
use crate::notifications::{Notification, NotificationKind, NotificationQueue};
use crate::storage::{DurableStorage, SqliteStorage};
use crate::token_store::TokenStore;
use crate::transport::{ReqwestTransport, Transport};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Terminal stand-in for the login redirect.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliNavigator;

impl Navigator for CliNavigator {
    fn redirect(&self, route: &str) {
        info!(route, "session invalidated");
        eprintln!("Your session has expired. Run `budgetdash login` to sign in again.");
    }
}

pub struct Services {
    pub config: ClientConfig,
    pub tokens: Arc<TokenStore>,
    pub api: Arc<ApiClient>,
    pub auth: AuthStore,
    pub data: AppStore,
    pub notifications: NotificationQueue,
}

impl Services {
    /// Production wiring: SQLite-backed credentials and a reqwest transport.
    pub fn init(config: ClientConfig) -> Result<Self> {
        let path = db::db_path(config.data_dir.as_deref())?;
        let storage = SqliteStorage::open(&path)
            .with_context(|| format!("Open credential store at {}", path.display()))?;
        let transport = ReqwestTransport::new(config.timeout)?;
        debug!(db = %path.display(), api = %config.api_url, "services initialised");
        Ok(Self::with_parts(
            config,
            Arc::new(storage),
            Arc::new(transport),
            Arc::new(CliNavigator),
        ))
    }

    pub fn with_parts(
        config: ClientConfig,
        storage: Arc<dyn DurableStorage>,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let tokens = Arc::new(TokenStore::new(storage));
        let gateway = Arc::new(Gateway::new(
            config.api_url.clone(),
            Arc::clone(&tokens),
            transport,
            navigator,
        ));
        let api = Arc::new(ApiClient::new(gateway));
        let notifications = NotificationQueue::new();
        let auth = AuthStore::new(Arc::clone(&api), Arc::clone(&tokens));
        let data = AppStore::new(Arc::clone(&api), notifications.clone());
        Self {
            config,
            tokens,
            api,
            auth,
            data,
            notifications,
        }
    }

    /// Print and drop every pending notification, returning what was shown.
    pub fn flush_notifications(&self) -> Vec<Notification> {
        let shown = self.notifications.drain();
        for n in &shown {
            let line = match &n.title {
                Some(title) => format!("{}: {}", title, n.message),
                None => n.message.clone(),
            };
            match n.kind {
                NotificationKind::Error | NotificationKind::Warning => {
                    eprintln!("[{}] {}", n.kind, line)
                }
                _ => println!("[{}] {}", n.kind, line),
            }
        }
        shown
    }
}
