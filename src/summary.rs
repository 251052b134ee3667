// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month-to-date totals and the remaining balance.
//!
//! Nothing here is cached: every call re-reads the period's totals from
//! `v_month_totals` and the active recurring rules, so the figure is never
//! stale.

use crate::models::{Kind, Summary};
use crate::period::ensure_period;
use crate::utils::today;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rusqlite::{Connection, params};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecurringTotals {
    pub savings: i64,
    pub investment: i64,
    pub spend: i64,
}

pub fn fetch_summary(conn: &Connection, user: &str) -> Result<Summary> {
    summary_for_month(conn, user, today())
}

/// Summary of the month containing `date`. Recurring allocations are not
/// versioned, so past months are computed with today's active rules.
pub fn summary_for_month(conn: &Connection, user: &str, date: NaiveDate) -> Result<Summary> {
    let period_id = ensure_period(conn, user, Some(date))?;
    let (month_start, income, spent, saved_one, invested_one): (String, i64, i64, i64, i64) = conn
        .query_row(
            "SELECT month_start, income_cents, expense_cents, savings_oneoff_cents, invest_oneoff_cents
             FROM v_month_totals WHERE user_id=?1 AND period_id=?2",
            params![user, period_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
        )
        .with_context(|| format!("Read month totals for period {}", period_id))?;
    let month_start = NaiveDate::parse_from_str(&month_start, "%Y-%m-%d")
        .with_context(|| format!("Invalid month_start '{}' in periods", month_start))?;

    let rec = recurring_active_totals(conn, user)?;
    let remaining = i128::from(income)
        - i128::from(rec.savings)
        - i128::from(rec.investment)
        - i128::from(rec.spend)
        - i128::from(spent)
        - i128::from(saved_one)
        - i128::from(invested_one);
    let remaining = i64::try_from(remaining)
        .map_err(|_| anyhow!("Remaining balance for period {} is out of range", period_id))?;

    Ok(Summary {
        income_cents: income,
        expense_cents: spent,
        savings_oneoff_cents: saved_one,
        invest_oneoff_cents: invested_one,
        rec_savings_cents: rec.savings,
        rec_invest_cents: rec.investment,
        rec_spend_cents: rec.spend,
        remaining_cents: remaining,
        month_start,
    })
}

/// Active recurring amounts summed per kind, named and unnamed rules alike.
pub fn recurring_active_totals(conn: &Connection, user: &str) -> Result<RecurringTotals> {
    let mut stmt = conn.prepare_cached(
        "SELECT kind, COALESCE(SUM(amount_cents), 0) FROM recurring_allocations
         WHERE user_id=?1 AND active=1 GROUP BY kind",
    )?;
    let mut rows = stmt.query(params![user])?;
    let mut totals = RecurringTotals::default();
    while let Some(r) = rows.next()? {
        let kind: String = r.get(0)?;
        let sum: i64 = r.get(1)?;
        let slot = match kind.parse::<Kind>()? {
            Kind::Savings => &mut totals.savings,
            Kind::Investment => &mut totals.investment,
            Kind::Spend => &mut totals.spend,
        };
        *slot = slot
            .checked_add(sum)
            .ok_or_else(|| anyhow!("Recurring {} total is out of range", kind))?;
    }
    Ok(totals)
}

/// True iff the current remaining balance covers `deduction_cents`.
/// A difference that does not fit in `i64` is never affordable.
///
/// This is a plain read. Callers that act on the answer should hold the
/// write lock across the check and the write.
pub fn can_afford(conn: &Connection, user: &str, deduction_cents: i64) -> Result<bool> {
    let s = fetch_summary(conn, user)?;
    let ok = s
        .remaining_cents
        .checked_sub(deduction_cents)
        .is_some_and(|left| left >= 0);
    if !ok {
        tracing::info!(
            user,
            remaining_cents = s.remaining_cents,
            deduction_cents,
            "insufficient balance"
        );
    }
    Ok(ok)
}
