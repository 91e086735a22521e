// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{opt_string, required};
use crate::models::RegisterRequest;
use crate::services::Services;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

pub async fn login(svc: &Services, m: &clap::ArgMatches) -> Result<()> {
    let email = required(m, "email")?;
    let password = required(m, "password")?;
    let user = svc.auth.login(email, password).await?;
    println!("Signed in as {} <{}>", user.display_name(), user.email);
    Ok(())
}

pub async fn register(svc: &Services, m: &clap::ArgMatches) -> Result<()> {
    let request = RegisterRequest {
        first_name: required(m, "first")?.trim().to_string(),
        last_name: required(m, "last")?.trim().to_string(),
        email: required(m, "email")?.to_string(),
        password: required(m, "password")?.to_string(),
        currency: opt_string(m, "currency").map(|c| c.to_uppercase()),
    };
    let user = svc.auth.register(&request).await?;
    println!(
        "Welcome, {}! Account created for {}",
        user.display_name(),
        user.email
    );
    Ok(())
}

pub async fn logout(svc: &Services) -> Result<()> {
    svc.auth.logout().await;
    println!("Signed out");
    Ok(())
}

pub async fn whoami(svc: &Services, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let Some(user) = svc.auth.restore_session().await else {
        println!("Not signed in");
        return Ok(());
    };
    if !maybe_print_json(json_flag, jsonl_flag, &user)? {
        let rows = vec![
            vec!["Name".to_string(), user.display_name()],
            vec!["Email".to_string(), user.email.clone()],
            vec!["Currency".to_string(), user.currency.clone()],
            vec![
                "Last login".to_string(),
                user.last_login_at
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
            ],
        ];
        println!("{}", pretty_table(&["Field", "Value"], rows));
    }
    Ok(())
}
