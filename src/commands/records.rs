// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::summary::show_if_requested;
use super::{amount_cents, check_outcome, id_arg, month_opt};
use crate::models::RecordKind;
use crate::records::{
    add_expense, add_income, add_investment_trade, add_savings_transfer, delete_record,
    list_records,
};
use crate::utils::{fmt_cents, get_currency_symbol, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(
    conn: &mut Connection,
    user: &str,
    kind: RecordKind,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user, kind, sub)?,
        Some(("list", sub)) => list(conn, user, kind, sub)?,
        Some(("rm", sub)) => rm(conn, user, kind, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, user: &str, kind: RecordKind, sub: &clap::ArgMatches) -> Result<()> {
    let amount = amount_cents(sub)?;
    let note = sub
        .try_get_one::<String>("note")
        .ok()
        .flatten()
        .map(|s| s.as_str());
    let outcome = match kind {
        RecordKind::Income => add_income(conn, user, amount, note)?,
        RecordKind::Expense => {
            let merchant = sub
                .get_one::<String>("merchant")
                .context("--merchant missing")?;
            let category = sub.get_one::<String>("category").map(|s| s.as_str());
            add_expense(conn, user, merchant, amount, category)?
        }
        RecordKind::Savings => add_savings_transfer(conn, user, amount, note)?,
        RecordKind::Investment => add_investment_trade(conn, user, amount, note)?,
    };
    check_outcome(&outcome, &format!("record this {}", kind))?;

    let ccy = get_currency_symbol(conn)?;
    println!(
        "Recorded {} {} (id {})",
        kind,
        fmt_cents(amount, &ccy),
        outcome.id.unwrap_or_default()
    );
    show_if_requested(conn, user, sub)?;
    Ok(())
}

fn list(conn: &Connection, user: &str, kind: RecordKind, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = list_records(conn, user, kind, month_opt(sub)?)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let ccy = get_currency_symbol(conn)?;
        let label = if kind == RecordKind::Expense {
            "Merchant"
        } else {
            "Note"
        };
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.created_at.clone(),
                    fmt_cents(r.amount_cents, &ccy),
                    r.label.clone().unwrap_or_default(),
                    r.category.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Created", "Amount", label, "Category"], rows)
        );
    }
    Ok(())
}

fn rm(conn: &Connection, user: &str, kind: RecordKind, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub)?;
    let outcome = delete_record(conn, user, kind, id)?;
    check_outcome(&outcome, &format!("delete: no {} with id {}", kind, id))?;
    println!("Removed {} {}", kind, id);
    show_if_requested(conn, user, sub)?;
    Ok(())
}
