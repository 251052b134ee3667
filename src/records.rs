// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! One-off incomes, expenses, savings transfers and investment trades.
//!
//! Records are append-only: they are inserted or deleted, never updated.
//! Everything except income must be affordable at insert time.

use crate::error::InputError;
use crate::guard::{atomically, guarded};
use crate::models::{Outcome, PeriodId, Record, RecordKind};
use crate::period::ensure_period;
use crate::summary::summary_for_month;
use crate::utils::{month_start, optional_text, require_text, today};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Transaction, params};

fn check_amount(amount_cents: i64) -> Result<(), InputError> {
    if amount_cents <= 0 {
        return Err(InputError::NonPositiveAmount(amount_cents.to_string()));
    }
    Ok(())
}

fn insert_noted(
    tx: &Transaction<'_>,
    kind: RecordKind,
    user: &str,
    period_id: PeriodId,
    amount_cents: i64,
    note: Option<&str>,
) -> Result<i64> {
    let sql = format!(
        "INSERT INTO {}(user_id, period_id, amount_cents, note) VALUES (?1, ?2, ?3, ?4)",
        kind.table()
    );
    tx.execute(&sql, params![user, period_id, amount_cents, note])?;
    let id = tx.last_insert_rowid();
    tracing::debug!(user, kind = %kind, id, amount_cents, "recorded");
    Ok(id)
}

/// Income only ever raises the remaining balance, so it is never guarded.
pub fn add_income(
    conn: &mut Connection,
    user: &str,
    amount_cents: i64,
    note: Option<&str>,
) -> Result<Outcome> {
    check_amount(amount_cents)?;
    let note = optional_text(note);
    atomically(conn, |tx| {
        let period_id = ensure_period(tx, user, None)?;
        let id = insert_noted(tx, RecordKind::Income, user, period_id, amount_cents, note.as_deref())?;
        Ok(Outcome::created(id))
    })
}

pub fn add_expense(
    conn: &mut Connection,
    user: &str,
    merchant: &str,
    amount_cents: i64,
    category: Option<&str>,
) -> Result<Outcome> {
    let merchant = require_text("merchant", merchant)?;
    check_amount(amount_cents)?;
    let category = optional_text(category);
    guarded(conn, user, amount_cents, |tx| {
        let period_id = ensure_period(tx, user, None)?;
        tx.execute(
            "INSERT INTO expenses(user_id, period_id, amount_cents, merchant, category)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user, period_id, amount_cents, merchant, category],
        )?;
        let id = tx.last_insert_rowid();
        tracing::debug!(user, id, amount_cents, merchant = %merchant, "recorded expense");
        Ok(Outcome::created(id))
    })
}

pub fn add_savings_transfer(
    conn: &mut Connection,
    user: &str,
    amount_cents: i64,
    note: Option<&str>,
) -> Result<Outcome> {
    add_guarded_noted(conn, RecordKind::Savings, user, amount_cents, note)
}

pub fn add_investment_trade(
    conn: &mut Connection,
    user: &str,
    amount_cents: i64,
    note: Option<&str>,
) -> Result<Outcome> {
    add_guarded_noted(conn, RecordKind::Investment, user, amount_cents, note)
}

fn add_guarded_noted(
    conn: &mut Connection,
    kind: RecordKind,
    user: &str,
    amount_cents: i64,
    note: Option<&str>,
) -> Result<Outcome> {
    check_amount(amount_cents)?;
    let note = optional_text(note);
    guarded(conn, user, amount_cents, |tx| {
        let period_id = ensure_period(tx, user, None)?;
        let id = insert_noted(tx, kind, user, period_id, amount_cents, note.as_deref())?;
        Ok(Outcome::created(id))
    })
}

/// Delete a record by id. Never guarded, see the warning below.
pub fn delete_record(conn: &Connection, user: &str, kind: RecordKind, id: i64) -> Result<Outcome> {
    let lookup = format!(
        "SELECT p.month_start FROM {} r JOIN periods p ON r.period_id=p.id
         WHERE r.id=?1 AND r.user_id=?2",
        kind.table()
    );
    let Some(month) = conn
        .query_row(&lookup, params![id, user], |r| r.get::<_, String>(0))
        .optional()?
    else {
        return Ok(Outcome::not_found());
    };
    let month = NaiveDate::parse_from_str(&month, "%Y-%m-%d")
        .with_context(|| format!("Invalid month_start '{}' in periods", month))?;

    let sql = format!("DELETE FROM {} WHERE id=?1 AND user_id=?2", kind.table());
    if conn.execute(&sql, params![id, user])? == 0 {
        return Ok(Outcome::not_found());
    }
    tracing::debug!(user, kind = %kind, id, "deleted record");
    if kind == RecordKind::Income {
        let s = summary_for_month(conn, user, month)?;
        if s.remaining_cents < 0 {
            tracing::warn!(
                user,
                id,
                month = %month.format("%Y-%m"),
                remaining_cents = s.remaining_cents,
                "income deleted; remaining balance is now negative"
            );
        }
    }
    Ok(Outcome::ok())
}

/// Records of `kind` in the month containing `month` (this month when `None`),
/// newest first.
pub fn list_records(
    conn: &Connection,
    user: &str,
    kind: RecordKind,
    month: Option<NaiveDate>,
) -> Result<Vec<Record>> {
    let start = month_start(month.unwrap_or_else(today));
    let category = if kind == RecordKind::Expense {
        "r.category"
    } else {
        "NULL"
    };
    let sql = format!(
        "SELECT r.id, r.amount_cents, r.{label}, {category}, r.created_at
         FROM {table} r JOIN periods p ON r.period_id=p.id
         WHERE r.user_id=?1 AND p.month_start=?2
         ORDER BY r.created_at DESC, r.id DESC",
        label = kind.label_column(),
        table = kind.table(),
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user, start.to_string()], |r| {
        Ok(Record {
            id: r.get(0)?,
            kind,
            amount_cents: r.get(1)?,
            label: r.get(2)?,
            category: r.get(3)?,
            created_at: r.get(4)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get_incomes(conn: &Connection, user: &str) -> Result<Vec<Record>> {
    list_records(conn, user, RecordKind::Income, None)
}
