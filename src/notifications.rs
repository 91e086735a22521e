// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ordered queue of transient user-facing messages.
//!
//! Each notification with a non-zero duration owns its own expiry task. The
//! task holds only a weak reference to the queue, and an explicit `remove`
//! aborts it, so dismissing one message never touches another's timer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_DURATION_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: Option<String>,
    pub message: String,
    /// Milliseconds until auto-removal; `0` persists until dismissed.
    pub duration: u64,
    pub created_at: DateTime<Utc>,
}

/// Input to [`NotificationQueue::add`]; unset fields take the queue defaults.
#[derive(Debug, Clone, Default)]
pub struct NewNotification {
    pub kind: Option<NotificationKind>,
    pub title: Option<String>,
    pub message: String,
    pub duration: Option<u64>,
}

impl NewNotification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(NotificationKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(NotificationKind::Error)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(NotificationKind::Warning)
    }

    pub fn with_kind(mut self, kind: NotificationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_duration(mut self, millis: u64) -> Self {
        self.duration = Some(millis);
        self
    }

    pub fn persistent(self) -> Self {
        self.with_duration(0)
    }
}

#[derive(Default)]
struct Inner {
    items: Vec<Notification>,
    timers: HashMap<String, JoinHandle<()>>,
}

impl Inner {
    fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        before != self.items.len()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }
}

#[derive(Clone, Default)]
pub struct NotificationQueue {
    inner: Arc<Mutex<Inner>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification and return its id. A positive duration schedules
    /// removal on the current tokio runtime.
    pub fn add(&self, input: NewNotification) -> String {
        let mut inner = lock(&self.inner);
        let id = loop {
            let candidate = new_id();
            if !inner.items.iter().any(|n| n.id == candidate) {
                break candidate;
            }
        };
        let notification = Notification {
            id: id.clone(),
            kind: input.kind.unwrap_or_default(),
            title: input.title,
            message: input.message,
            duration: input.duration.unwrap_or(DEFAULT_DURATION_MS),
            created_at: Utc::now(),
        };
        let duration = notification.duration;
        debug!(id = %id, kind = %notification.kind, "notification added");
        inner.items.push(notification);

        if duration > 0 {
            match Handle::try_current() {
                Ok(handle) => {
                    let timer = handle.spawn(expire(
                        Arc::downgrade(&self.inner),
                        id.clone(),
                        Duration::from_millis(duration),
                    ));
                    inner.timers.insert(id.clone(), timer);
                }
                Err(_) => warn!(id = %id, "no async runtime; notification will not auto-expire"),
            }
        }
        id
    }

    /// Remove by id and cancel its timer. Unknown ids are ignored.
    pub fn remove(&self, id: &str) {
        let mut inner = lock(&self.inner);
        if inner.remove(id) {
            debug!(id, "notification removed");
        }
        if let Some(timer) = inner.timers.remove(id) {
            timer.abort();
        }
    }

    pub fn clear(&self) {
        let mut inner = lock(&self.inner);
        inner.items.clear();
        for (_, timer) in inner.timers.drain() {
            timer.abort();
        }
    }

    /// Take every queued notification, cancelling their timers.
    pub fn drain(&self) -> Vec<Notification> {
        let mut inner = lock(&self.inner);
        for (_, timer) in inner.timers.drain() {
            timer.abort();
        }
        std::mem::take(&mut inner.items)
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        lock(&self.inner).items.clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        lock(&self.inner).items.iter().any(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

async fn expire(queue: Weak<Mutex<Inner>>, id: String, after: Duration) {
    tokio::time::sleep(after).await;
    let Some(queue) = queue.upgrade() else {
        return;
    };
    let mut inner = lock(&queue);
    // Drop our own handle without aborting; this task is finishing anyway.
    inner.timers.remove(&id);
    if inner.remove(&id) {
        debug!(id = %id, "notification expired");
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn new_id() -> String {
    format!(
        "{}-{:08x}",
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}
