// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::summary::show_if_requested;
use super::{amount_cents, amount_cents_allow_zero, check_outcome, id_arg};
use crate::models::Kind;
use crate::recurring::{
    add_recurring, delete_recurring, list_recurring, set_recurring_active,
    set_recurring_active_by_id, update_recurring, upsert_recurring,
};
use crate::utils::{fmt_cents, get_currency_symbol, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    match name {
        "set" => {
            let kind = kind_arg(sub)?;
            let amount = amount_cents_allow_zero(sub)?;
            let outcome = upsert_recurring(conn, user, kind, amount)?;
            check_outcome(&outcome, &format!("raise the active {} rule", kind))?;
            let ccy = get_currency_symbol(conn)?;
            println!("Recurring {} set to {}", kind, fmt_cents(amount, &ccy));
        }
        "on" => toggle_kind(conn, user, sub, true)?,
        "off" => toggle_kind(conn, user, sub, false)?,
        "add" => {
            let kind = kind_arg(sub)?;
            let amount = amount_cents(sub)?;
            let description = sub
                .get_one::<String>("description")
                .context("--description missing")?;
            let outcome = add_recurring(conn, user, kind, amount, description)?;
            check_outcome(&outcome, "add this recurring rule")?;
            let ccy = get_currency_symbol(conn)?;
            println!(
                "Added recurring {} '{}' {} (id {})",
                kind,
                description.trim(),
                fmt_cents(amount, &ccy),
                outcome.id.unwrap_or_default()
            );
        }
        "update" => {
            let id = id_arg(sub)?;
            let amount = amount_cents_allow_zero(sub)?;
            let description = sub.get_one::<String>("description").map(|s| s.as_str());
            let outcome = update_recurring(conn, user, id, amount, description)?;
            check_outcome(&outcome, &format!("update recurring rule {}", id))?;
            let ccy = get_currency_symbol(conn)?;
            println!("Recurring rule {} set to {}", id, fmt_cents(amount, &ccy));
        }
        "enable" => toggle_id(conn, user, sub, true)?,
        "disable" => toggle_id(conn, user, sub, false)?,
        "rm" => {
            let id = id_arg(sub)?;
            let outcome = delete_recurring(conn, user, id)?;
            check_outcome(&outcome, &format!("delete: no recurring rule {}", id))?;
            println!("Removed recurring rule {}", id);
        }
        "list" => return list(conn, user, sub),
        _ => return Ok(()),
    }
    show_if_requested(conn, user, sub)?;
    Ok(())
}

fn kind_arg(sub: &clap::ArgMatches) -> Result<Kind> {
    let raw = sub.get_one::<String>("kind").context("--kind missing")?;
    Ok(raw.parse::<Kind>()?)
}

fn toggle_kind(conn: &mut Connection, user: &str, sub: &clap::ArgMatches, active: bool) -> Result<()> {
    let kind = kind_arg(sub)?;
    let outcome = set_recurring_active(conn, user, kind, active)?;
    check_outcome(&outcome, &format!("activate the {} rule", kind))?;
    println!(
        "Recurring {} {}",
        kind,
        if active { "activated" } else { "deactivated" }
    );
    Ok(())
}

fn toggle_id(conn: &mut Connection, user: &str, sub: &clap::ArgMatches, active: bool) -> Result<()> {
    let id = id_arg(sub)?;
    let outcome = set_recurring_active_by_id(conn, user, id, active)?;
    check_outcome(&outcome, &format!("activate recurring rule {}", id))?;
    println!(
        "Recurring rule {} {}",
        id,
        if active { "activated" } else { "deactivated" }
    );
    Ok(())
}

fn list(conn: &Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let kind = match sub.get_one::<String>("kind") {
        Some(k) => Some(k.parse::<Kind>()?),
        None => None,
    };
    let data = list_recurring(conn, user, kind)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let ccy = get_currency_symbol(conn)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.kind.to_string(),
                    r.description.clone().unwrap_or_else(|| "(default)".into()),
                    fmt_cents(r.amount_cents, &ccy),
                    if r.active { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Kind", "Description", "Amount", "Active"], rows)
        );
    }
    Ok(())
}
