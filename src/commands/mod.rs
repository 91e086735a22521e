// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod auth;
pub mod categories;
pub mod transactions;
pub mod goals;
pub mod reports;
pub mod exporter;

use crate::models::TransactionQuery;
use crate::services::Services;
use crate::utils::parse_date;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::ArgMatches;
use std::str::FromStr;
use tracing::warn;

/// Page size used when a report or export walks the whole ledger.
pub const LEDGER_LIMIT: u64 = 1000;

pub(crate) fn required<'a>(m: &'a ArgMatches, id: &str) -> Result<&'a String> {
    m.get_one::<String>(id)
        .with_context(|| format!("Missing required argument '{}'", id))
}

pub(crate) fn opt_string(m: &ArgMatches, id: &str) -> Option<String> {
    m.get_one::<String>(id).map(|s| s.to_string())
}

pub(crate) fn opt_date(m: &ArgMatches, id: &str) -> Result<Option<NaiveDate>> {
    m.get_one::<String>(id).map(|s| parse_date(s)).transpose()
}

pub(crate) fn opt_parse<T>(m: &ArgMatches, id: &str) -> Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    m.get_one::<String>(id)
        .map(|s| s.parse::<T>().map_err(|e| anyhow!(e)))
        .transpose()
}

/// Load categories and every page of the date-bounded ledger side by side.
/// Categories are only used for labels, so their failure is reported but not
/// fatal.
pub(crate) async fn load_ledger(
    svc: &Services,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<()> {
    let query = TransactionQuery {
        limit: Some(LEDGER_LIMIT),
        start_date,
        end_date,
        ..Default::default()
    };
    let (categories, transactions) = tokio::join!(
        svc.data.load_categories(None),
        svc.data.load_all_transactions(&query)
    );
    if let Err(e) = categories {
        warn!(error = %e, "continuing without category names");
    }
    transactions?;
    Ok(())
}
