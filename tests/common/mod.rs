// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use async_trait::async_trait;
use budgetdash::config::ClientConfig;
use budgetdash::gateway::Navigator;
use budgetdash::services::Services;
use budgetdash::storage::{DurableStorage, MemoryStorage};
use budgetdash::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "http://api.test/api";

pub enum Reply {
    Json(u16, Value),
    Raw(u16, String),
    Fail(TransportError),
}

struct Step {
    path: Option<String>,
    delay: Option<Duration>,
    reply: Reply,
}

/// Replays canned responses. A step bound to a path only answers requests
/// whose URL path ends with it; unbound steps answer anything, first come
/// first served.
#[derive(Default)]
pub struct ScriptedTransport {
    steps: Mutex<Vec<Step>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, reply: Reply) {
        self.add(None, None, reply);
    }

    pub fn push_for(&self, path: &str, reply: Reply) {
        self.add(Some(path), None, reply);
    }

    pub fn push_delayed(&self, path: &str, delay: Duration, reply: Reply) {
        self.add(Some(path), Some(delay), reply);
    }

    fn add(&self, path: Option<&str>, delay: Option<Duration>, reply: Reply) {
        self.steps.lock().unwrap().push(Step {
            path: path.map(str::to_string),
            delay,
            reply,
        });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.steps.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = request.url.path().to_string();
        self.requests.lock().unwrap().push(request);
        let step = {
            let mut steps = self.steps.lock().unwrap();
            let idx = steps
                .iter()
                .position(|s| s.path.as_deref().is_none_or(|p| path.ends_with(p)));
            match idx {
                Some(i) => steps.remove(i),
                None => return Err(TransportError::new(format!("no scripted reply for {}", path))),
            }
        };
        if let Some(delay) = step.delay {
            tokio::time::sleep(delay).await;
        }
        match step.reply {
            Reply::Json(status, body) => Ok(HttpResponse::json(status, &body)),
            Reply::Raw(status, body) => Ok(HttpResponse::new(status, body)),
            Reply::Fail(e) => Err(e),
        }
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

pub struct Harness {
    pub svc: Services,
    pub transport: Arc<ScriptedTransport>,
    pub navigator: Arc<RecordingNavigator>,
    pub storage: Arc<MemoryStorage>,
}

pub fn harness() -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    harness_with(Arc::clone(&storage) as Arc<dyn DurableStorage>, storage)
}

/// Harness whose credential store starts out holding `token`.
pub fn signed_in(token: &str) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set_item(budgetdash::token_store::ACCESS_TOKEN_KEY, token)
        .unwrap();
    harness_with(Arc::clone(&storage) as Arc<dyn DurableStorage>, storage)
}

fn harness_with(dyn_storage: Arc<dyn DurableStorage>, storage: Arc<MemoryStorage>) -> Harness {
    let transport = ScriptedTransport::new();
    let navigator = Arc::new(RecordingNavigator::default());
    let config = ClientConfig {
        api_url: BASE_URL.to_string(),
        ..ClientConfig::default()
    };
    let svc = Services::with_parts(
        config,
        dyn_storage,
        Arc::clone(&transport) as Arc<dyn Transport>,
        Arc::clone(&navigator) as Arc<dyn Navigator>,
    );
    Harness {
        svc,
        transport,
        navigator,
        storage,
    }
}

pub fn ok(data: Value) -> Reply {
    Reply::Json(200, json!({ "success": true, "data": data }))
}

pub fn created(data: Value) -> Reply {
    Reply::Json(201, json!({ "success": true, "data": data }))
}

pub fn user_json() -> Value {
    json!({
        "_id": "u1",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "currency": "GBP"
    })
}

pub fn category_json(id: &str, name: &str, kind: &str) -> Value {
    json!({ "_id": id, "name": name, "type": kind, "color": "#22c55e", "icon": "tag" })
}

pub fn tx_json(id: &str, amount: f64, kind: &str, category_id: &str, date: &str) -> Value {
    json!({
        "_id": id,
        "amount": amount,
        "description": format!("tx {}", id),
        "categoryId": category_id,
        "date": date,
        "type": kind,
        "currency": "USD"
    })
}

pub fn goal_json(id: &str, current: f64, target: f64, deadline: Option<&str>) -> Value {
    json!({
        "_id": id,
        "title": format!("goal {}", id),
        "targetAmount": target,
        "currentAmount": current,
        "endDate": deadline,
        "priority": "medium",
        "status": "active",
        "currency": "USD"
    })
}

pub fn body_of(req: &HttpRequest) -> Value {
    req.body.clone().unwrap_or(Value::Null)
}
