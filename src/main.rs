// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitCode;

use leftover::models::RecordKind;
use leftover::{cli, commands, db, period, utils};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(rejected) = err.downcast_ref::<commands::Rejected>() {
                eprintln!("{}", rejected.message);
                return ExitCode::from(2);
            }
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let level = matches
        .get_one::<String>("log_level")
        .map(|s| s.as_str())
        .unwrap_or("warn");
    tracing_subscriber::fmt()
        .with_env_filter(format!("leftover={level}"))
        .with_writer(std::io::stderr)
        .init();

    let db_path = matches.get_one::<String>("db").map(PathBuf::from);
    let mut conn = db::open_or_init(db_path.as_deref())?;

    let user = match matches.get_one::<String>("user") {
        Some(u) => utils::require_text("user", u)?,
        None => utils::get_default_user(&conn)?,
    };
    period::ensure_profile(&conn, &user)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            let path = match db_path {
                Some(p) => p,
                None => db::db_path()?,
            };
            println!("Database initialized at {} for '{}'", path.display(), user);
        }
        Some(("income", sub)) => {
            commands::records::handle(&mut conn, &user, RecordKind::Income, sub)?
        }
        Some(("expense", sub)) => {
            commands::records::handle(&mut conn, &user, RecordKind::Expense, sub)?
        }
        Some(("savings", sub)) => {
            commands::records::handle(&mut conn, &user, RecordKind::Savings, sub)?
        }
        Some(("invest", sub)) => {
            commands::records::handle(&mut conn, &user, RecordKind::Investment, sub)?
        }
        Some(("recurring", sub)) => commands::recurring::handle(&mut conn, &user, sub)?,
        Some(("summary", sub)) => commands::summary::handle(&conn, &user, sub)?,
        Some(("periods", sub)) => commands::summary::periods(&conn, &user, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, &user, sub)?,
        Some(("config", sub)) => commands::config::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
