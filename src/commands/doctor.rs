// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::period::list_periods;
use crate::summary::summary_for_month;
use crate::utils::{fmt_cents, get_currency_symbol, month_start, pretty_table, today};
use anyhow::Result;
use rusqlite::Connection;

/// Problems the guards cannot prevent: balances driven negative by deleted
/// income or by writes that bypassed this tool.
///
/// Recurring rules are not versioned, so only the current month is judged
/// with them. Past months are judged on their one-off records alone.
pub fn check(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let ccy = get_currency_symbol(conn)?;
    let current = month_start(today());
    let mut rows = Vec::new();

    // 1) Overdrawn months
    let mut stmt = conn.prepare("SELECT id FROM profiles ORDER BY id")?;
    let users = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for user in &users {
        for p in list_periods(conn, user)? {
            let s = summary_for_month(conn, user, p.month_start)?;
            let (remaining, basis) = if p.month_start == current {
                (s.remaining_cents, "")
            } else {
                let one_off = s
                    .remaining_cents
                    .saturating_add(s.rec_savings_cents)
                    .saturating_add(s.rec_invest_cents)
                    .saturating_add(s.rec_spend_cents);
                (one_off, " before recurring")
            };
            if remaining < 0 {
                rows.push(vec![
                    "overdrawn".into(),
                    format!(
                        "{} {} remaining {}{}",
                        user,
                        p.month_start.format("%Y-%m"),
                        fmt_cents(remaining, &ccy),
                        basis
                    ),
                ]);
            }
        }
    }

    // 2) Active rules that contribute nothing
    let mut stmt2 = conn.prepare(
        "SELECT user_id, id, kind FROM recurring_allocations
         WHERE active=1 AND amount_cents=0 ORDER BY user_id, id",
    )?;
    let mut cur = stmt2.query([])?;
    while let Some(r) = cur.next()? {
        let user: String = r.get(0)?;
        let id: i64 = r.get(1)?;
        let kind: String = r.get(2)?;
        rows.push(vec![
            "active_zero_rule".into(),
            format!("{} rule {} ({})", user, id, kind),
        ]);
    }
    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = check(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
