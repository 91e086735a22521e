// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Single chokepoint for every HTTP call to the backend.
//!
//! The gateway is the only layer that interprets HTTP status codes. A 401
//! invalidates the stored credential and asks the [`Navigator`] to send the
//! user to the login route before the error reaches the caller.

use crate::error::{ApiError, ApiResult};
use crate::token_store::TokenStore;
use crate::transport::{HttpRequest, Transport};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const LOGIN_ROUTE: &str = "/login";

/// Receives the forced navigation issued on an expired session.
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: &str);
}

/// Navigator for headless use: records the redirect in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, route: &str) {
        warn!(route, "session invalidated; navigation requested");
    }
}

/// Status plus JSON body of a 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub status: u16,
    pub body: Value,
}

pub type QueryParams<'a> = [(&'a str, Option<String>)];

pub struct Gateway {
    base_url: String,
    tokens: Arc<TokenStore>,
    transport: Arc<dyn Transport>,
    navigator: Arc<dyn Navigator>,
}

impl Gateway {
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<TokenStore>,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            tokens,
            transport,
            navigator,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Issue `method path` with an optional JSON body and extra headers.
    /// Extra headers replace the defaults of the same name.
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> ApiResult<ParsedResponse> {
        let url = self.url(path, &[])?;
        self.execute(method, url, body, headers).await
    }

    /// GET with `params` encoded as a query string. `None` values are skipped.
    pub async fn get(&self, path: &str, params: &QueryParams<'_>) -> ApiResult<ParsedResponse> {
        let url = self.url(path, params)?;
        self.execute(Method::GET, url, None, &[]).await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> ApiResult<ParsedResponse> {
        self.request(path, Method::POST, body, &[]).await
    }

    pub async fn put(&self, path: &str, body: Option<Value>) -> ApiResult<ParsedResponse> {
        self.request(path, Method::PUT, body, &[]).await
    }

    pub async fn patch(&self, path: &str, body: Option<Value>) -> ApiResult<ParsedResponse> {
        self.request(path, Method::PATCH, body, &[]).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<ParsedResponse> {
        self.request(path, Method::DELETE, None, &[]).await
    }

    fn url(&self, path: &str, params: &QueryParams<'_>) -> ApiResult<Url> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| ApiError::Malformed {
            status: 0,
            message: format!("Invalid request URL '{}': {}", raw, e),
        })?;
        let present: Vec<(&str, &str)> = params
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (*k, v)))
            .collect();
        if !present.is_empty() {
            url.query_pairs_mut().extend_pairs(present);
        }
        Ok(url)
    }

    fn headers(&self, extra: &[(&str, &str)]) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.tokens.get() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                ApiError::Malformed {
                    status: 0,
                    message: format!("Stored token is not a valid header value: {}", e),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| ApiError::Malformed {
                status: 0,
                message: format!("Invalid header name '{}': {}", name, e),
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| ApiError::Malformed {
                status: 0,
                message: format!("Invalid value for header '{}': {}", name, e),
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    #[instrument(skip(self, body, extra_headers), fields(path = %url.path()))]
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
        extra_headers: &[(&str, &str)],
    ) -> ApiResult<ParsedResponse> {
        let headers = self.headers(extra_headers)?;
        let request = HttpRequest {
            method: method.clone(),
            url,
            headers,
            body,
        };
        debug!(%method, "sending request");

        let response = match self.transport.send(request).await {
            Ok(r) => r,
            Err(e) if e.timed_out => {
                warn!(error = %e, "request timed out");
                return Err(ApiError::timeout(e));
            }
            Err(e) => {
                warn!(error = %e, "request failed before a response arrived");
                return Err(ApiError::network(e));
            }
        };

        let status = response.status;
        let body = parse_body(&response.body);
        if (200..=299).contains(&status) {
            debug!(status, "request succeeded");
            return Ok(ParsedResponse { status, body });
        }

        if status == 401 {
            warn!("received 401; clearing credential");
            self.tokens.clear();
            self.navigator.redirect(LOGIN_ROUTE);
        }
        let err = ApiError::from_status(status, body);
        warn!(status, error = %err, "request rejected");
        Err(err)
    }
}

/// JSON body, or `null` for an empty or non-JSON payload.
fn parse_body(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or(Value::Null)
}
