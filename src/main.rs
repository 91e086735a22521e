// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitCode;

use budgetdash::config::ClientConfig;
use budgetdash::error::ActionFailure;
use budgetdash::notifications::NotificationKind;
use budgetdash::services::Services;
use budgetdash::{cli, commands};

fn init_logging() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "budgetdash=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run(svc: &Services, matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("login", sub)) => commands::auth::login(svc, sub).await?,
        Some(("register", sub)) => commands::auth::register(svc, sub).await?,
        Some(("logout", _)) => commands::auth::logout(svc).await?,
        Some(("whoami", sub)) => commands::auth::whoami(svc, sub).await?,
        Some(("category", sub)) => commands::categories::handle(svc, sub).await?,
        Some(("tx", sub)) => commands::transactions::handle(svc, sub).await?,
        Some(("goal", sub)) => commands::goals::handle(svc, sub).await?,
        Some(("report", sub)) => commands::reports::handle(svc, sub).await?,
        Some(("export", sub)) => commands::exporter::handle(svc, sub).await?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_logging();

    let matches = cli::build_cli().get_matches();
    let config = ClientConfig::from_env()?.with_overrides(
        matches.get_one::<String>("api-url").map(|s| s.as_str()),
        matches.get_one::<PathBuf>("data-dir").map(|p| p.as_path()),
    )?;
    let svc = Services::init(config)?;

    let outcome = run(&svc, &matches).await;
    let shown = svc.flush_notifications();
    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            let already_shown = e.downcast_ref::<ActionFailure>().is_some_and(|f| {
                shown
                    .iter()
                    .any(|n| n.kind == NotificationKind::Error && n.message == f.message)
            });
            if !already_shown {
                eprintln!("Error: {:#}", e);
            }
            if let Some(f) = e.downcast_ref::<ActionFailure>() {
                for issue in &f.issues {
                    eprintln!("  {}: {}", issue.field, issue.message);
                }
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
