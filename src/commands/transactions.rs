// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{opt_date, opt_parse, opt_string, required};
use crate::models::{EntryType, NewTransaction, TransactionQuery, TransactionUpdate};
use crate::services::Services;
use crate::utils::{fmt_money, maybe_print_json, parse_amount, pretty_table};
use anyhow::{Result, bail};
use chrono::Utc;
use serde::Serialize;

pub async fn handle(svc: &Services, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(svc, sub).await?,
        Some(("add", sub)) => add(svc, sub).await?,
        Some(("edit", sub)) => edit(svc, sub).await?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            svc.data.delete_transaction(id).await?;
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

async fn add(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let input = NewTransaction {
        amount: parse_amount(required(sub, "amount")?)?,
        description: required(sub, "description")?.trim().to_string(),
        notes: opt_string(sub, "notes"),
        category_id: required(sub, "category")?.to_string(),
        date: opt_date(sub, "date")?.unwrap_or_else(|| Utc::now().date_naive()),
        kind: opt_parse::<EntryType>(sub, "type")?.unwrap_or(EntryType::Expense),
        currency: opt_string(sub, "currency").map(|c| c.to_uppercase()),
    };
    let tx = svc.data.create_transaction(&input).await?;
    println!(
        "Recorded {} {} on {} '{}' (id {})",
        tx.kind,
        fmt_money(&tx.amount, &tx.currency),
        tx.date.format("%Y-%m-%d"),
        tx.description,
        tx.id
    );
    Ok(())
}

async fn edit(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let update = TransactionUpdate {
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_amount(s))
            .transpose()?,
        description: opt_string(sub, "description"),
        notes: opt_string(sub, "notes"),
        category_id: opt_string(sub, "category"),
        date: opt_date(sub, "date")?,
        kind: opt_parse(sub, "type")?,
    };
    if update.amount.is_none()
        && update.description.is_none()
        && update.notes.is_none()
        && update.category_id.is_none()
        && update.date.is_none()
        && update.kind.is_none()
    {
        bail!("Nothing to update; pass at least one field to change");
    }
    let tx = svc.data.update_transaction(id, &update).await?;
    println!(
        "Updated transaction {}: {} '{}'",
        tx.id,
        fmt_money(&tx.amount, &tx.currency),
        tx.description
    );
    Ok(())
}

async fn list(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let query = query_from(sub)?;
    let (categories, transactions) = tokio::join!(
        svc.data.load_categories(None),
        svc.data.load_transactions(&query)
    );
    transactions?;
    if let Err(e) = categories {
        tracing::warn!(error = %e, "showing category ids instead of names");
    }
    let data = rows(svc);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let table_rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.date.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.category.clone(),
                    r.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Type", "Amount", "CCY", "Category", "Description"],
                table_rows,
            )
        );
        if let Some(p) = &svc.data.state().pagination {
            println!("Page {}/{} ({} total)", p.page, p.pages.max(1), p.total);
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub kind: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub description: String,
}

/// Store transactions joined with category names, in store order.
pub fn rows(svc: &Services) -> Vec<TransactionRow> {
    let state = svc.data.state();
    state
        .transactions
        .iter()
        .map(|t| TransactionRow {
            id: t.id.clone(),
            date: t.date.format("%Y-%m-%d").to_string(),
            kind: t.kind.to_string(),
            amount: format!("{:.2}", t.amount),
            currency: t.currency.clone(),
            category: state
                .category(&t.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| t.category_id.clone()),
            description: t.description.clone(),
        })
        .collect()
}

pub fn query_from(sub: &clap::ArgMatches) -> Result<TransactionQuery> {
    Ok(TransactionQuery {
        page: sub.get_one::<u64>("page").copied(),
        limit: sub.get_one::<u64>("limit").copied(),
        kind: opt_parse(sub, "type")?,
        category_id: opt_string(sub, "category"),
        start_date: opt_date(sub, "from")?,
        end_date: opt_date(sub, "to")?,
        search: opt_string(sub, "search").filter(|s| !s.trim().is_empty()),
    })
}
