// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::month_opt;
use crate::period::list_periods;
use crate::models::Summary;
use crate::summary::{fetch_summary, summary_for_month};
use crate::utils::{fmt_cents, get_currency_symbol, maybe_print_json, pretty_table, today};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let date = month_opt(sub)?.unwrap_or_else(today);
    let s = summary_for_month(conn, user, date)?;
    if maybe_print_json(json_flag, jsonl_flag, &s)? {
        return Ok(());
    }
    print_summary(conn, &s)
}

/// Print the current month's summary when the write was run with
/// `--show-summary`. Returns whether anything was printed.
pub fn show_if_requested(
    conn: &Connection,
    user: &str,
    sub: &clap::ArgMatches,
) -> Result<bool> {
    if !sub.get_flag("show_summary") {
        return Ok(false);
    }
    print_summary(conn, &fetch_summary(conn, user)?)?;
    Ok(true)
}

fn print_summary(conn: &Connection, s: &Summary) -> Result<()> {
    let ccy = get_currency_symbol(conn)?;
    let money = |c: i64| fmt_cents(c, &ccy);
    let rows = vec![
        vec!["Income".into(), money(s.income_cents), String::new()],
        vec![
            "Savings".into(),
            money(s.savings_total()),
            format!(
                "{} recurring + {} one-off",
                money(s.rec_savings_cents),
                money(s.savings_oneoff_cents)
            ),
        ],
        vec![
            "Investments".into(),
            money(s.invest_total()),
            format!(
                "{} recurring + {} one-off",
                money(s.rec_invest_cents),
                money(s.invest_oneoff_cents)
            ),
        ],
        vec![
            "Spending".into(),
            money(s.spend_total()),
            format!(
                "{} recurring + {} one-off",
                money(s.rec_spend_cents),
                money(s.expense_cents)
            ),
        ],
        vec!["Remaining".into(), money(s.remaining_cents), String::new()],
    ];
    println!("For {}", s.month_start.format("%B %Y"));
    println!("{}", pretty_table(&["", "Total", "Breakdown"], rows));
    Ok(())
}

pub fn periods(conn: &Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = list_periods(conn, user)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|p| vec![p.id.to_string(), p.month_start.format("%Y-%m").to_string()])
            .collect();
        println!("{}", pretty_table(&["ID", "Month"], rows));
    }
    Ok(())
}
