// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod api;
pub mod app_store;
pub mod auth_store;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod notifications;
pub mod services;
pub mod storage;
pub mod token_store;
pub mod transport;
pub mod utils;
pub mod view_models;
