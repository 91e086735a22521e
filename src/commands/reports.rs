// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::goals::{goal_rows, goal_table};
use super::{load_ledger, opt_date, opt_parse};
use crate::models::{Category, EntryType};
use crate::services::Services;
use crate::utils::{maybe_print_json, parse_amount, pretty_table};
use crate::view_models::{
    BudgetStatus, CategoryTotal, budget_status, group_by_category, monthly_totals, sum_by_type,
};
use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};

pub async fn handle(svc: &Services, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("by-category", sub)) => by_category(svc, sub).await?,
        Some(("budget", sub)) => budget(svc, sub).await?,
        Some(("goals", sub)) => goals(svc, sub).await?,
        Some(("trend", sub)) => trend(svc, sub).await?,
        Some(("dashboard", sub)) => dashboard(svc, sub).await?,
        _ => {}
    }
    Ok(())
}

async fn by_category(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let kind = opt_parse::<EntryType>(sub, "type")?;
    load_ledger(svc, opt_date(sub, "from")?, opt_date(sub, "to")?).await?;
    let state = svc.data.state();
    let data: Vec<CategoryTotal> = group_by_category(&state.transactions, &state.categories)
        .into_iter()
        .filter(|t| kind.is_none_or(|k| t.kind == k))
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.name.clone(),
                    t.kind.to_string(),
                    t.count.to_string(),
                    format!("{:.2}", t.total),
                    format!("{}%", t.percentage_of_total),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Type", "Count", "Total", "Share"], rows)
        );
        println!(
            "Income {:.2} | Expense {:.2}",
            sum_by_type(&state.transactions, EntryType::Income),
            sum_by_type(&state.transactions, EntryType::Expense)
        );
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRow {
    pub category: String,
    pub spent: Decimal,
    pub budget: Decimal,
    pub status: BudgetStatus,
}

/// `CATEGORY=AMOUNT` pairs from the command line.
pub fn parse_budget_specs<'a>(
    specs: impl IntoIterator<Item = &'a String>,
) -> Result<Vec<(String, Decimal)>> {
    specs
        .into_iter()
        .map(|spec| -> Result<(String, Decimal)> {
            let (name, amount) = spec
                .rsplit_once('=')
                .with_context(|| format!("Invalid budget '{}', expected CATEGORY=AMOUNT", spec))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(anyhow!("Invalid budget '{}': empty category", spec));
            }
            Ok((name.to_string(), parse_amount(amount)?))
        })
        .collect()
}

/// Classify spending per budgeted expense category. Categories are matched by
/// id first, then by case-insensitive name.
pub fn budget_rows(
    totals: &[CategoryTotal],
    categories: &[Category],
    budgets: &[(String, Decimal)],
) -> Result<Vec<BudgetRow>> {
    budgets
        .iter()
        .map(|(key, budget)| -> Result<BudgetRow> {
            let category = categories
                .iter()
                .filter(|c| c.kind == EntryType::Expense)
                .find(|c| c.id == *key)
                .or_else(|| {
                    categories
                        .iter()
                        .filter(|c| c.kind == EntryType::Expense)
                        .find(|c| c.name.eq_ignore_ascii_case(key))
                })
                .with_context(|| format!("Unknown expense category '{}'", key))?;
            let spent = totals
                .iter()
                .find(|t| t.category_id == category.id && t.kind == EntryType::Expense)
                .map(|t| t.total)
                .unwrap_or(Decimal::ZERO);
            Ok(BudgetRow {
                category: category.name.clone(),
                spent,
                budget: *budget,
                status: budget_status(spent, *budget),
            })
        })
        .collect()
}

async fn budget(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let specs = parse_budget_specs(sub.get_many::<String>("budget").into_iter().flatten())?;
    load_ledger(svc, opt_date(sub, "from")?, opt_date(sub, "to")?).await?;
    let state = svc.data.state();
    let totals = group_by_category(&state.transactions, &state.categories);
    let data = budget_rows(&totals, &state.categories, &specs)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.category.clone(),
                    format!("{:.2}", r.spent),
                    format!("{:.2}", r.budget),
                    format!("{:.2}", r.budget - r.spent),
                    r.status.as_str().to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Spent", "Budget", "Left", "Status"], rows)
        );
    }
    Ok(())
}

async fn goals(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    svc.data.load_goals(None).await?;
    let data = goal_rows(&svc.data.state().goals, Utc::now());
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("{}", goal_table(&data));
    }
    Ok(())
}

async fn trend(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);
    load_ledger(svc, None, None).await?;
    let mut data = monthly_totals(&svc.data.state().transactions);
    if data.len() > months {
        data.drain(..data.len() - months);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|m| {
                vec![
                    m.month.clone(),
                    format!("{:.2}", m.income),
                    format!("{:.2}", m.expense),
                    format!("{:.2}", m.net()),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expense", "Net"], rows)
        );
    }
    Ok(())
}

async fn dashboard(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let period = sub.get_one::<String>("period").map(|s| s.as_str());
    svc.data.load_dashboard(period).await?;
    let Some(snapshot) = svc.data.state().dashboard.clone() else {
        return Ok(());
    };
    let v = json!({ "overview": snapshot.overview, "stats": snapshot.stats });
    if !maybe_print_json(json_flag, jsonl_flag, &v)? {
        let mut rows = Vec::new();
        flatten_scalars("overview", &snapshot.overview, &mut rows);
        flatten_scalars("stats", &snapshot.stats, &mut rows);
        println!("{}", pretty_table(&["Metric", "Value"], rows));
    }
    Ok(())
}

/// Dotted-path rows for every scalar leaf; arrays are summarised by length.
pub fn flatten_scalars(prefix: &str, v: &Value, out: &mut Vec<Vec<String>>) {
    match v {
        Value::Object(map) => {
            for (k, child) in map {
                flatten_scalars(&format!("{}.{}", prefix, k), child, out);
            }
        }
        Value::Array(items) => out.push(vec![prefix.to_string(), format!("[{} items]", items.len())]),
        Value::Null => {}
        Value::String(s) => out.push(vec![prefix.to_string(), s.clone()]),
        other => out.push(vec![prefix.to_string(), other.to_string()]),
    }
}
