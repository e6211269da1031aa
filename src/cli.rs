// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, ArgGroup, Command, value_parser};

const TYPES: [&str; 2] = ["income", "expense"];
const PERIODS: [&str; 3] = ["weekly", "monthly", "yearly"];

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .help("Print as pretty JSON")
            .action(ArgAction::SetTrue),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .help("Print as JSON lines")
            .action(ArgAction::SetTrue)
            .conflicts_with("json"),
    )
}

fn range_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("period")
            .long("period")
            .value_parser(PERIODS)
            .conflicts_with("last-days")
            .help("Current week, month or year (default monthly)"),
    )
    .arg(
        Arg::new("from")
            .long("from")
            .conflicts_with_all(["period", "last-days"])
            .help("Start date YYYY-MM-DD"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .conflicts_with_all(["period", "last-days"])
            .help("End date YYYY-MM-DD"),
    )
    .arg(
        Arg::new("last-days")
            .long("last-days")
            .value_parser(value_parser!(u32))
            .help("Today and the N days before it"),
    )
}

fn type_arg(required: bool) -> Arg {
    Arg::new("type")
        .long("type")
        .value_parser(TYPES)
        .required(required)
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand(
            Command::new("add")
                .arg(
                    Arg::new("date")
                        .long("date")
                        .help("YYYY-MM-DD, defaults to today"),
                )
                .arg(type_arg(true))
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .required(true)
                        .allow_negative_numbers(true),
                )
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("note").long("note")),
        )
        .subcommand(
            Command::new("edit")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("date").long("date"))
                .arg(type_arg(false))
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .allow_negative_numbers(true),
                )
                .arg(Arg::new("category").long("category"))
                .arg(
                    Arg::new("note")
                        .long("note")
                        .help("New note; an empty string clears it"),
                ),
        )
        .subcommand(
            Command::new("rm").arg(
                Arg::new("id")
                    .long("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
        .subcommand(json_args(
            Command::new("list")
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .value_parser(value_parser!(usize))
                        .default_value("0"),
                )
                .arg(
                    Arg::new("date")
                        .long("date")
                        .help("Only transactions on this day, ignoring paging"),
                ),
        ))
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(type_arg(true))
                .arg(Arg::new("icon").long("icon").default_value("")),
        )
        .subcommand(
            Command::new("edit")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("name").long("name"))
                .arg(type_arg(false))
                .arg(Arg::new("icon").long("icon")),
        )
        .subcommand(json_args(Command::new("list").arg(type_arg(false))))
        .subcommand(
            Command::new("rm").arg(
                Arg::new("id")
                    .long("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
        .subcommand(Command::new("seed").about("Insert the default set into an empty list"))
}

fn budget_cmd() -> Command {
    let month = || {
        Arg::new("month")
            .long("month")
            .help("YYYY-MM, defaults to the current month")
    };
    Command::new("budget")
        .about("Monthly budget and savings goal")
        .subcommand(
            Command::new("set")
                .arg(month())
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .allow_negative_numbers(true),
                )
                .arg(
                    Arg::new("savings-goal")
                        .long("savings-goal")
                        .allow_negative_numbers(true),
                )
                .group(
                    ArgGroup::new("values")
                        .args(["amount", "savings-goal"])
                        .multiple(true)
                        .required(true),
                ),
        )
        .subcommand(json_args(Command::new("show").arg(month())))
        .subcommand(json_args(Command::new("progress").arg(month())))
}

fn stats_cmd() -> Command {
    Command::new("stats")
        .about("Income and expense statistics")
        .subcommand(json_args(range_args(Command::new("summary"))))
        .subcommand(json_args(range_args(
            Command::new("categories").arg(type_arg(false).default_value("expense")),
        )))
        .subcommand(json_args(
            Command::new("chart").arg(
                Arg::new("period")
                    .long("period")
                    .value_parser(PERIODS)
                    .default_value("monthly"),
            ),
        ))
        .subcommand(json_args(range_args(
            Command::new("category")
                .arg(Arg::new("name").long("name").required(true))
                .arg(type_arg(false).default_value("expense")),
        )))
}

fn pin_cmd() -> Command {
    Command::new("pin")
        .about("Local PIN lock")
        .subcommand(
            Command::new("set")
                .arg(Arg::new("new").long("new").required(true))
                .arg(Arg::new("confirm").long("confirm").required(true)),
        )
        .subcommand(
            Command::new("change")
                .arg(Arg::new("current").long("current").required(true))
                .arg(Arg::new("new").long("new").required(true))
                .arg(Arg::new("confirm").long("confirm").required(true)),
        )
        .subcommand(Command::new("clear"))
        .subcommand(Command::new("unlock").about("Check the global --pin against the lock"))
        .subcommand(Command::new("status"))
}

pub fn build_cli() -> Command {
    Command::new("tallybook")
        .version(clap::crate_version!())
        .about("Personal income and expense tracker")
        .arg(
            Arg::new("pin")
                .long("pin")
                .global(true)
                .help("PIN for a locked book"),
        )
        .subcommand(Command::new("init").about("Create the database and default categories"))
        .subcommand(tx_cmd())
        .subcommand(category_cmd())
        .subcommand(budget_cmd())
        .subcommand(stats_cmd())
        .subcommand(json_args(
            Command::new("calendar")
                .about("Month grid with daily totals")
                .arg(Arg::new("month").long("month").help("YYYY-MM")),
        ))
        .subcommand(
            Command::new("settings")
                .about("Application preferences")
                .subcommand(json_args(Command::new("list")))
                .subcommand(Command::new("get").arg(Arg::new("key").long("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(
                            Arg::new("value")
                                .long("value")
                                .required(true)
                                .allow_hyphen_values(true),
                        ),
                ),
        )
        .subcommand(pin_cmd())
        .subcommand(
            Command::new("export")
                .about("Write a backup file")
                .arg(Arg::new("out").long("out").required(true))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("json")
                        .help("json|csv"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Restore a backup or append a CSV")
                .subcommand(
                    Command::new("backup")
                        .about("Replace everything with a JSON backup")
                        .arg(Arg::new("path").long("path").required(true)),
                )
                .subcommand(
                    Command::new("csv")
                        .about("Append transactions from CSV")
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Report data inconsistencies"))
}
