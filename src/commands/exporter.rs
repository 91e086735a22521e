// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{load_ledger, opt_date, required};
use crate::models::{Category, Transaction};
use crate::services::Services;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::path::Path;

pub async fn handle(svc: &Services, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(svc, sub).await,
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => bail!("Unknown format: {} (use csv|json)", other),
        }
    }
}

async fn export_transactions(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let format: ExportFormat = required(sub, "format")?.parse()?;
    let out = required(sub, "out")?;
    load_ledger(svc, opt_date(sub, "from")?, opt_date(sub, "to")?).await?;
    let state = svc.data.state();
    let n = write_transactions(Path::new(out), format, &state.transactions, &state.categories)?;
    println!("Exported {} transactions to {}", n, out);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    date: String,
    #[serde(rename = "type")]
    kind: &'a str,
    amount: String,
    currency: &'a str,
    category: &'a str,
    description: &'a str,
    notes: &'a str,
}

/// Write `transactions` to `out`, labelling categories by name where known.
/// Returns the number of rows written.
pub fn write_transactions(
    out: &Path,
    format: ExportFormat,
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<usize> {
    let rows: Vec<ExportRow<'_>> = transactions
        .iter()
        .map(|t| ExportRow {
            date: t.date.format("%Y-%m-%d").to_string(),
            kind: t.kind.as_str(),
            amount: format!("{:.2}", t.amount),
            currency: &t.currency,
            category: categories
                .iter()
                .find(|c| c.id == t.category_id)
                .map(|c| c.name.as_str())
                .unwrap_or(t.category_id.as_str()),
            description: &t.description,
            notes: t.notes.as_deref().unwrap_or(""),
        })
        .collect();

    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            if rows.is_empty() {
                wtr.write_record([
                    "date",
                    "type",
                    "amount",
                    "currency",
                    "category",
                    "description",
                    "notes",
                ])?;
            }
            wtr.flush()?;
        }
        ExportFormat::Json => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
    }
    Ok(rows.len())
}
