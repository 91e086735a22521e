// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{opt_date, opt_parse, opt_string, required};
use crate::models::{Goal, GoalPriority, GoalStatus, GoalUpdate, NewGoal};
use crate::services::Services;
use crate::utils::{fmt_money, maybe_print_json, parse_amount, parse_decimal, pretty_table};
use crate::view_models::goal_progress;
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub async fn handle(svc: &Services, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(svc, sub).await?,
        Some(("add", sub)) => add(svc, sub).await?,
        Some(("edit", sub)) => edit(svc, sub).await?,
        Some(("contribute", sub)) => {
            let id = required(sub, "id")?;
            let amount = parse_decimal(required(sub, "amount")?)?;
            let goal = svc.data.contribute_to_goal(id, amount).await?;
            let progress = goal_progress(&goal, Utc::now());
            println!(
                "'{}' is now at {} of {} ({:.0}%)",
                goal.title,
                fmt_money(&goal.current_amount, &goal.currency),
                fmt_money(&goal.target_amount, &goal.currency),
                progress.display_percentage()
            );
        }
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            svc.data.delete_goal(id).await?;
            println!("Removed goal {}", id);
        }
        _ => {}
    }
    Ok(())
}

async fn add(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let current = parse_decimal(required(sub, "current")?)?;
    if current < Decimal::ZERO {
        bail!("--current cannot be negative");
    }
    let input = NewGoal {
        title: required(sub, "title")?.trim().to_string(),
        description: opt_string(sub, "description"),
        target_amount: parse_amount(required(sub, "target")?)?,
        current_amount: current,
        end_date: opt_date(sub, "deadline")?,
        priority: opt_parse::<GoalPriority>(sub, "priority")?.unwrap_or(GoalPriority::Medium),
        currency: opt_string(sub, "currency").map(|c| c.to_uppercase()),
    };
    let goal = svc.data.create_goal(&input).await?;
    println!(
        "Created goal '{}' targeting {} (id {})",
        goal.title,
        fmt_money(&goal.target_amount, &goal.currency),
        goal.id
    );
    Ok(())
}

async fn edit(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let update = GoalUpdate {
        title: opt_string(sub, "title"),
        description: opt_string(sub, "description"),
        target_amount: sub
            .get_one::<String>("target")
            .map(|s| parse_amount(s))
            .transpose()?,
        end_date: opt_date(sub, "deadline")?,
        priority: opt_parse(sub, "priority")?,
        status: opt_parse(sub, "status")?,
    };
    if update.title.is_none()
        && update.description.is_none()
        && update.target_amount.is_none()
        && update.end_date.is_none()
        && update.priority.is_none()
        && update.status.is_none()
    {
        bail!("Nothing to update; pass at least one field to change");
    }
    let goal = svc.data.update_goal(id, &update).await?;
    println!("Updated goal '{}'", goal.title);
    Ok(())
}

async fn list(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let status = opt_parse::<GoalStatus>(sub, "status")?;
    svc.data.load_goals(status).await?;
    let state = svc.data.state();
    let data = goal_rows(&state.goals, Utc::now());
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("{}", goal_table(&data));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct GoalRow {
    pub id: String,
    pub title: String,
    pub status: String,
    pub current: Decimal,
    pub target: Decimal,
    pub currency: String,
    pub percentage: Decimal,
    pub days_remaining: Option<i64>,
    pub overdue: bool,
}

pub fn goal_rows(goals: &[Goal], now: DateTime<Utc>) -> Vec<GoalRow> {
    goals
        .iter()
        .map(|g| {
            let p = goal_progress(g, now);
            GoalRow {
                id: g.id.clone(),
                title: g.title.clone(),
                status: g.status.as_str().to_string(),
                current: g.current_amount,
                target: g.target_amount,
                currency: g.currency.clone(),
                percentage: p.display_percentage().round_dp(1),
                days_remaining: p.days_remaining,
                overdue: p.is_overdue() && g.status != GoalStatus::Completed,
            }
        })
        .collect()
}

pub(crate) fn goal_table(data: &[GoalRow]) -> comfy_table::Table {
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|r| {
            let days = match r.days_remaining {
                Some(d) if r.overdue => format!("{} overdue", -d),
                Some(d) => d.to_string(),
                None => "-".to_string(),
            };
            vec![
                r.id.clone(),
                r.title.clone(),
                r.status.clone(),
                fmt_money(&r.current, &r.currency),
                fmt_money(&r.target, &r.currency),
                format!("{}%", r.percentage),
                days,
            ]
        })
        .collect();
    pretty_table(
        &["Id", "Goal", "Status", "Saved", "Target", "Progress", "Days left"],
        rows,
    )
}
