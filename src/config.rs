// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_URL_VAR: &str = "BUDGETDASH_API_URL";
pub const TIMEOUT_VAR: &str = "BUDGETDASH_TIMEOUT_SECS";
pub const DATA_DIR_VAR: &str = "BUDGETDASH_DATA_DIR";

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    /// `None` means the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup(API_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = lookup(TIMEOUT_VAR)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            data_dir,
        }
        .validated()
    }

    pub fn with_overrides(mut self, api_url: Option<&str>, data_dir: Option<&Path>) -> Result<Self> {
        if let Some(url) = api_url {
            self.api_url = url.trim().to_string();
        }
        if let Some(dir) = data_dir {
            self.data_dir = Some(dir.to_path_buf());
        }
        self.validated()
    }

    fn validated(mut self) -> Result<Self> {
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("Invalid API base URL '{}'", self.api_url))?;
        Ok(self)
    }
}
