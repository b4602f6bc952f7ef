// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn range_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("from")
            .long("from")
            .help("Start date, inclusive (YYYY-MM-DD)"),
    )
    .arg(
        Arg::new("to")
            .long("to")
            .help("End date, inclusive (YYYY-MM-DD)"),
    )
    .arg(
        Arg::new("category")
            .long("category")
            .help("Category to include, or 'all'"),
    )
}

fn expense_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("category")
            .long("category")
            .required(required)
            .help("FOOD, HOUSEHOLD, TRANSPORTATION, ENTERTAINMENT, HEALTH, OTHER, ..."),
    )
    .arg(
        Arg::new("description")
            .long("description")
            .short('d')
            .required(required)
            .help("Good or service"),
    )
    .arg(
        Arg::new("amount")
            .long("amount")
            .required(required)
            .allow_hyphen_values(true),
    )
    .arg(
        Arg::new("currency")
            .long("currency")
            .help("Currency the amount is in (defaults to the base currency)"),
    )
    .arg(
        Arg::new("date")
            .long("date")
            .help("YYYY-MM-DD (defaults to today)"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

pub fn build_cli() -> Command {
    Command::new("spendbook")
        .about("Personal expense tracking with base-currency totals and CSV/PDF export")
        .version(crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("SPENDBOOK_DB")
                .help("Path to the SQLite database"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("expense")
                .about("Add, edit, remove and list expenses")
                .subcommand(expense_fields(Command::new("add"), true))
                .subcommand(expense_fields(Command::new("edit").arg(id_arg()), false))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_flags(Command::new("show").arg(id_arg())))
                .subcommand(json_flags(range_args(
                    Command::new("list")
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .short('s')
                                .help("Case-insensitive text in category, description or date"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))),
        )
        .subcommand(json_flags(range_args(
            Command::new("summary").about("Totals, daily average and breakdowns for a date range"),
        )))
        .subcommand(
            Command::new("export")
                .about("Write expenses to a file")
                .subcommand_required(true)
                .subcommand(range_args(Command::new("csv").arg(out_arg())))
                .subcommand(range_args(Command::new("json").arg(out_arg())))
                .subcommand(range_args(Command::new("pdf").arg(out_arg()))),
        )
        .subcommand(
            Command::new("category")
                .about("Expense categories")
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("fx")
                .about("Base currency and exchange rates")
                .subcommand(
                    Command::new("set-base").arg(Arg::new("currency").required(true)),
                )
                .subcommand(
                    Command::new("add")
                        .about("Record 1 BASE = RATE QUOTE on DATE")
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("base").long("base").required(true))
                        .arg(Arg::new("quote").long("quote").required(true))
                        .arg(Arg::new("rate").long("rate").required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("fetch")
                        .about("Download daily rates from Frankfurter (ECB)")
                        .arg(
                            Arg::new("days")
                                .long("days")
                                .help("Days of history, 1 to 3650 (default 120)")
                                .value_parser(value_parser!(u16).range(1..=3650)),
                        ),
                )
                .subcommand(
                    Command::new("convert")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("from").long("from").required(true))
                        .arg(Arg::new("to").long("to").required(true))
                        .arg(Arg::new("date").long("date")),
                ),
        )
}

fn out_arg() -> Arg {
    Arg::new("out").long("out").short('o').required(true)
}
