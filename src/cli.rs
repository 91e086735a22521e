// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn entry_type(required: bool) -> Arg {
    Arg::new("type")
        .long("type")
        .required(required)
        .value_parser(["income", "expense"])
        .help("income|expense")
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Server id")
}

fn auth_commands() -> Vec<Command> {
    vec![
        Command::new("login")
            .about("Sign in and store the credential locally")
            .arg(Arg::new("email").long("email").required(true))
            .arg(
                Arg::new("password")
                    .long("password")
                    .env("BUDGETDASH_PASSWORD")
                    .required(true)
                    .hide_env_values(true),
            ),
        Command::new("register")
            .about("Create an account and sign in")
            .arg(Arg::new("first").long("first-name").required(true))
            .arg(Arg::new("last").long("last-name").required(true))
            .arg(Arg::new("email").long("email").required(true))
            .arg(
                Arg::new("password")
                    .long("password")
                    .env("BUDGETDASH_PASSWORD")
                    .required(true)
                    .hide_env_values(true),
            )
            .arg(Arg::new("currency").long("currency").help("e.g. USD")),
        Command::new("logout").about("Sign out and forget the stored credential"),
        json_flags(Command::new("whoami").about("Show the signed-in user")),
    ]
}

fn category_command() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("list")
                .about("List categories")
                .arg(entry_type(false)),
        ))
        .subcommand(
            Command::new("add")
                .about("Create a category")
                .arg(Arg::new("name").required(true))
                .arg(entry_type(true))
                .arg(Arg::new("color").long("color").default_value("#6366f1"))
                .arg(Arg::new("icon").long("icon").default_value("tag")),
        )
        .subcommand(
            Command::new("edit")
                .about("Update a category")
                .arg(id_arg())
                .arg(Arg::new("name").long("name"))
                .arg(entry_type(false))
                .arg(Arg::new("color").long("color"))
                .arg(Arg::new("icon").long("icon")),
        )
        .subcommand(Command::new("rm").about("Delete a category").arg(id_arg()))
}

fn tx_command() -> Command {
    Command::new("tx")
        .about("Manage transactions")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("list")
                .about("List transactions")
                .arg(
                    Arg::new("page")
                        .long("page")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(u64)),
                )
                .arg(entry_type(false))
                .arg(Arg::new("category").long("category").help("Category id"))
                .arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").help("YYYY-MM-DD"))
                .arg(Arg::new("search").long("search")),
        ))
        .subcommand(
            Command::new("add")
                .about("Record a transaction")
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(entry_type(true))
                .arg(
                    Arg::new("category")
                        .long("category")
                        .required(true)
                        .help("Category id"),
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .required(true),
                )
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today"))
                .arg(Arg::new("notes").long("notes"))
                .arg(Arg::new("currency").long("currency")),
        )
        .subcommand(
            Command::new("edit")
                .about("Update a transaction")
                .arg(id_arg())
                .arg(Arg::new("amount").long("amount"))
                .arg(entry_type(false))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(Command::new("rm").about("Delete a transaction").arg(id_arg()))
}

fn goal_command() -> Command {
    Command::new("goal")
        .about("Manage savings goals")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("list").about("List goals with progress").arg(
                Arg::new("status")
                    .long("status")
                    .value_parser(["active", "completed", "paused"]),
            ),
        ))
        .subcommand(
            Command::new("add")
                .about("Create a goal")
                .arg(Arg::new("title").required(true))
                .arg(Arg::new("target").long("target").required(true))
                .arg(Arg::new("current").long("current").default_value("0"))
                .arg(Arg::new("deadline").long("deadline").help("YYYY-MM-DD"))
                .arg(
                    Arg::new("priority")
                        .long("priority")
                        .value_parser(["low", "medium", "high"])
                        .default_value("medium"),
                )
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("currency").long("currency")),
        )
        .subcommand(
            Command::new("edit")
                .about("Update a goal")
                .arg(id_arg())
                .arg(Arg::new("title").long("title"))
                .arg(Arg::new("target").long("target"))
                .arg(Arg::new("deadline").long("deadline"))
                .arg(
                    Arg::new("priority")
                        .long("priority")
                        .value_parser(["low", "medium", "high"]),
                )
                .arg(
                    Arg::new("status")
                        .long("status")
                        .value_parser(["active", "completed", "paused"]),
                )
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(
            Command::new("contribute")
                .about("Add money to a goal")
                .arg(id_arg())
                .arg(Arg::new("amount").long("amount").required(true)),
        )
        .subcommand(Command::new("rm").about("Delete a goal").arg(id_arg()))
}

fn report_command() -> Command {
    Command::new("report")
        .about("Aggregates over your data")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("by-category")
                .about("Totals and share per category")
                .arg(entry_type(false))
                .arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").help("YYYY-MM-DD")),
        ))
        .subcommand(json_flags(
            Command::new("budget")
                .about("Spending against per-category budgets")
                .arg(
                    Arg::new("budget")
                        .long("budget")
                        .action(ArgAction::Append)
                        .required(true)
                        .help("CATEGORY=AMOUNT, category by name or id; repeatable"),
                )
                .arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").help("YYYY-MM-DD")),
        ))
        .subcommand(json_flags(
            Command::new("goals").about("Progress and days remaining per goal"),
        ))
        .subcommand(json_flags(
            Command::new("trend").about("Income and expense per month").arg(
                Arg::new("months")
                    .long("months")
                    .value_parser(value_parser!(usize))
                    .default_value("12"),
            ),
        ))
        .subcommand(json_flags(
            Command::new("dashboard")
                .about("Server-side overview and stats")
                .arg(
                    Arg::new("period")
                        .long("period")
                        .help("e.g. week|month|year"),
                ),
        ))
}

fn export_command() -> Command {
    Command::new("export")
        .about("Export data")
        .subcommand_required(true)
        .subcommand(
            Command::new("transactions")
                .about("Export transactions")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .required(true)
                        .help("csv|json"),
                )
                .arg(Arg::new("out").long("out").required(true))
                .arg(Arg::new("from").long("from").help("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").help("YYYY-MM-DD")),
        )
}

pub fn build_cli() -> Command {
    Command::new("budgetdash")
        .about("Personal finance dashboard client")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("Backend base URL, overrides BUDGETDASH_API_URL"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Local data dir, overrides BUDGETDASH_DATA_DIR"),
        )
        .subcommands(auth_commands())
        .subcommand(category_command())
        .subcommand(tx_command())
        .subcommand(goal_command())
        .subcommand(report_command())
        .subcommand(export_command())
}
