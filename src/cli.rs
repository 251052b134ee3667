// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .value_name("YYYY-MM")
        .help("Month to show (default: current month)")
}

fn list_cmd() -> Command {
    json_flags(Command::new("list").about("List records of a month").arg(month_arg()))
}

/// Added to every subcommand that writes.
fn show_summary_arg() -> Arg {
    Arg::new("show_summary")
        .long("show-summary")
        .action(ArgAction::SetTrue)
        .help("Print this month's summary after the change")
}

fn rm_cmd() -> Command {
    Command::new("rm")
        .about("Delete a record by id")
        .arg(Arg::new("id").long("id").required(true))
        .arg(show_summary_arg())
}

fn amount_arg() -> Arg {
    Arg::new("amount")
        .long("amount")
        .required(true)
        .allow_hyphen_values(true)
        .help("Amount in major units, e.g. 12.50")
}

fn kind_arg() -> Arg {
    Arg::new("kind")
        .long("kind")
        .required(true)
        .help("savings | investment | spend")
}

fn noted_record(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(amount_arg())
                .arg(Arg::new("note").long("note"))
                .arg(show_summary_arg()),
        )
        .subcommand(list_cmd())
        .subcommand(rm_cmd())
}

pub fn build_cli() -> Command {
    Command::new("leftover")
        .version(crate_version!())
        .about("Month-to-date budgeting: what is left to spend")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("LEFTOVER_DB")
                .value_name("PATH")
                .help("SQLite database file (default: platform data dir)"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .env("LEFTOVER_USER")
                .value_name("ID")
                .help("User id (default: configured default user)"),
        )
        .arg(
            Arg::new("log_level")
                .long("log-level")
                .global(true)
                .env("LEFTOVER_LOG")
                .default_value("warn")
                .help("trace | debug | info | warn | error"),
        )
        .subcommand(Command::new("init").about("Create the database and the user profile"))
        .subcommand(noted_record("income", "Record income"))
        .subcommand(
            Command::new("expense")
                .about("Record spending")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("merchant").long("merchant").required(true))
                        .arg(amount_arg())
                        .arg(Arg::new("category").long("category"))
                        .arg(show_summary_arg()),
                )
                .subcommand(list_cmd())
                .subcommand(rm_cmd()),
        )
        .subcommand(noted_record("savings", "Record one-off savings transfers"))
        .subcommand(noted_record("invest", "Record one-off investment trades"))
        .subcommand(
            Command::new("recurring")
                .about("Recurring monthly allocations")
                .subcommand_required(true)
                .subcommand(
                    Command::new("set")
                        .about("Set the amount of the default rule of a kind")
                        .arg(kind_arg())
                        .arg(amount_arg())
                        .arg(show_summary_arg()),
                )
                .subcommand(
                    Command::new("on")
                        .about("Activate the default rule of a kind")
                        .arg(kind_arg())
                        .arg(show_summary_arg()),
                )
                .subcommand(
                    Command::new("off")
                        .about("Deactivate the default rule of a kind")
                        .arg(kind_arg())
                        .arg(show_summary_arg()),
                )
                .subcommand(
                    Command::new("add")
                        .about("Add a named, active rule")
                        .arg(kind_arg())
                        .arg(amount_arg())
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(show_summary_arg()),
                )
                .subcommand(
                    Command::new("update")
                        .about("Change the amount of a rule by id")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(amount_arg())
                        .arg(Arg::new("description").long("description"))
                        .arg(show_summary_arg()),
                )
                .subcommand(
                    Command::new("enable")
                        .about("Activate a rule by id")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(show_summary_arg()),
                )
                .subcommand(
                    Command::new("disable")
                        .about("Deactivate a rule by id")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(show_summary_arg()),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a rule by id")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(show_summary_arg()),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(Arg::new("kind").long("kind")),
                )),
        )
        .subcommand(json_flags(
            Command::new("summary")
                .about("Month-to-date totals and remaining balance")
                .arg(month_arg()),
        ))
        .subcommand(json_flags(
            Command::new("periods").about("List the months with activity"),
        ))
        .subcommand(
            Command::new("export")
                .about("Export a month's records")
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("csv")
                        .help("csv | json"),
                )
                .arg(Arg::new("out").long("out").required(true))
                .arg(month_arg()),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand_required(true)
                .subcommand(Command::new("show"))
                .subcommand(Command::new("set-user").arg(Arg::new("value").required(true)))
                .subcommand(Command::new("set-currency").arg(Arg::new("value").required(true))),
        )
        .subcommand(Command::new("doctor").about("Check for overdrawn months"))
}
