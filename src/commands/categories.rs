// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{opt_parse, opt_string, required};
use crate::models::{CategoryUpdate, EntryType, NewCategory};
use crate::services::Services;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, bail};

pub async fn handle(svc: &Services, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(svc, sub).await?,
        Some(("add", sub)) => {
            let input = NewCategory {
                name: required(sub, "name")?.trim().to_string(),
                kind: opt_parse::<EntryType>(sub, "type")?.unwrap_or(EntryType::Expense),
                color: required(sub, "color")?.to_string(),
                icon: required(sub, "icon")?.to_string(),
            };
            let category = svc.data.create_category(&input).await?;
            println!(
                "Added category '{}' ({}, id {})",
                category.name, category.kind, category.id
            );
        }
        Some(("edit", sub)) => {
            let id = required(sub, "id")?;
            let update = CategoryUpdate {
                name: opt_string(sub, "name"),
                kind: opt_parse(sub, "type")?,
                color: opt_string(sub, "color"),
                icon: opt_string(sub, "icon"),
            };
            if update.name.is_none()
                && update.kind.is_none()
                && update.color.is_none()
                && update.icon.is_none()
            {
                bail!("Nothing to update; pass at least one of --name, --type, --color, --icon");
            }
            let category = svc.data.update_category(id, &update).await?;
            println!("Updated category '{}'", category.name);
        }
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            svc.data.delete_category(id).await?;
            println!("Removed category {}", id);
        }
        _ => {}
    }
    Ok(())
}

async fn list(svc: &Services, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let kind = opt_parse::<EntryType>(sub, "type")?;
    svc.data.load_categories(kind).await?;
    let state = svc.data.state();
    if !maybe_print_json(json_flag, jsonl_flag, state.categories.as_ref())? {
        let rows: Vec<Vec<String>> = state
            .categories
            .iter()
            .map(|c| {
                vec![
                    c.id.clone(),
                    c.name.clone(),
                    c.kind.to_string(),
                    c.color.clone(),
                    c.icon.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Category", "Type", "Color", "Icon"], rows)
        );
    }
    Ok(())
}
