// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recurring monthly allocations.
//!
//! Two flavours share one table: the unnamed rule of each kind (addressed by
//! kind, `description IS NULL`) and any number of named rules (addressed by
//! id). Active rules of either flavour count against the remaining balance.

use crate::error::InputError;
use crate::guard::{atomically, guarded};
use crate::models::{Kind, Outcome, RecurringAllocation, RecurringMap};
use crate::summary::can_afford;
use crate::utils::{optional_text, require_text};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, ToSql, params};

const RULE_COLUMNS: &str = "id, kind, description, amount_cents, active";

fn check_amount(amount_cents: i64) -> Result<(), InputError> {
    if amount_cents < 0 {
        return Err(InputError::NonPositiveAmount(amount_cents.to_string()));
    }
    Ok(())
}

fn read_rules(conn: &Connection, sql: &str, args: &[&dyn ToSql]) -> Result<Vec<RecurringAllocation>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, i64>(3)?,
            r.get::<_, bool>(4)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, kind, description, amount_cents, active) = row?;
        out.push(RecurringAllocation {
            id,
            kind: kind
                .parse::<Kind>()
                .with_context(|| format!("Invalid kind '{}' on recurring rule {}", kind, id))?,
            description,
            amount_cents,
            active,
        });
    }
    Ok(out)
}

fn unnamed_rule(conn: &Connection, user: &str, kind: Kind) -> Result<Option<RecurringAllocation>> {
    let sql = format!(
        "SELECT {RULE_COLUMNS} FROM recurring_allocations
         WHERE user_id=?1 AND kind=?2 AND description IS NULL"
    );
    Ok(read_rules(conn, &sql, params![user, kind.as_str()])?
        .into_iter()
        .next())
}

fn rule_by_id(conn: &Connection, user: &str, id: i64) -> Result<Option<RecurringAllocation>> {
    let sql = format!("SELECT {RULE_COLUMNS} FROM recurring_allocations WHERE user_id=?1 AND id=?2");
    Ok(read_rules(conn, &sql, params![user, id])?.into_iter().next())
}

fn unnamed_rule_id(conn: &Connection, user: &str, kind: Kind) -> Result<i64> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM recurring_allocations
             WHERE user_id=?1 AND kind=?2 AND description IS NULL",
            params![user, kind.as_str()],
            |r| r.get(0),
        )
        .optional()?;
    id.with_context(|| format!("Recurring {} rule for '{}' not found", kind, user))
}

/// Set the amount of the unnamed rule of `kind`, creating it (inactive) if absent.
///
/// Raising an active rule must be affordable by the increase; every other
/// edit goes through unconditionally.
pub fn upsert_recurring(
    conn: &mut Connection,
    user: &str,
    kind: Kind,
    amount_cents: i64,
) -> Result<Outcome> {
    check_amount(amount_cents)?;
    atomically(conn, |tx| {
        if let Some(rule) = unnamed_rule(tx, user, kind)?.filter(|r| r.active) {
            let delta = amount_cents - rule.amount_cents;
            if delta > 0 && !can_afford(tx, user, delta)? {
                return Ok(Outcome::insufficient());
            }
        }
        tx.execute(
            "INSERT INTO recurring_allocations(user_id, kind, amount_cents) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, kind) WHERE description IS NULL
             DO UPDATE SET amount_cents=excluded.amount_cents, updated_at=datetime('now')",
            params![user, kind.as_str(), amount_cents],
        )?;
        tracing::debug!(user, %kind, amount_cents, "recurring amount set");
        Ok(Outcome::created(unnamed_rule_id(tx, user, kind)?))
    })
}

/// Switch the unnamed rule of `kind` on or off.
///
/// Turning on must be affordable for the rule's full amount. A missing rule
/// counts as zero and is created with that amount.
pub fn set_recurring_active(
    conn: &mut Connection,
    user: &str,
    kind: Kind,
    active: bool,
) -> Result<Outcome> {
    atomically(conn, |tx| {
        let existing = unnamed_rule(tx, user, kind)?;
        if active {
            if let Some(rule) = existing.as_ref().filter(|r| r.active) {
                return Ok(Outcome::created(rule.id));
            }
            let amount = existing.as_ref().map(|r| r.amount_cents).unwrap_or(0);
            if !can_afford(tx, user, amount)? {
                return Ok(Outcome::insufficient());
            }
        }
        tx.execute(
            "INSERT INTO recurring_allocations(user_id, kind, active) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, kind) WHERE description IS NULL
             DO UPDATE SET active=excluded.active, updated_at=datetime('now')",
            params![user, kind.as_str(), active],
        )?;
        tracing::debug!(user, %kind, active, "recurring rule toggled");
        Ok(Outcome::created(unnamed_rule_id(tx, user, kind)?))
    })
}

/// Unnamed rule of every kind; kinds without a rule read as zero and inactive.
pub fn get_recurring(conn: &Connection, user: &str) -> Result<RecurringMap> {
    let sql = format!(
        "SELECT {RULE_COLUMNS} FROM recurring_allocations
         WHERE user_id=?1 AND description IS NULL"
    );
    let mut map = RecurringMap::default();
    for rule in read_rules(conn, &sql, params![user])? {
        let state = map.get_mut(rule.kind);
        state.amount_cents = rule.amount_cents;
        state.active = rule.active;
    }
    Ok(map)
}

/// Create an active named rule; its full amount must be affordable.
pub fn add_recurring(
    conn: &mut Connection,
    user: &str,
    kind: Kind,
    amount_cents: i64,
    description: &str,
) -> Result<Outcome> {
    let description = require_text("description", description)?;
    if amount_cents <= 0 {
        return Err(InputError::NonPositiveAmount(amount_cents.to_string()).into());
    }
    guarded(conn, user, amount_cents, |tx| {
        tx.execute(
            "INSERT INTO recurring_allocations(user_id, kind, description, amount_cents, active)
             VALUES (?1, ?2, ?3, ?4, 1)",
            params![user, kind.as_str(), description, amount_cents],
        )?;
        let id = tx.last_insert_rowid();
        tracing::debug!(user, %kind, id, amount_cents, "named recurring rule added");
        Ok(Outcome::created(id))
    })
}

/// Change a rule's amount (and optionally its description) by id.
pub fn update_recurring(
    conn: &mut Connection,
    user: &str,
    id: i64,
    amount_cents: i64,
    description: Option<&str>,
) -> Result<Outcome> {
    check_amount(amount_cents)?;
    let description = optional_text(description);
    atomically(conn, |tx| {
        let Some(rule) = rule_by_id(tx, user, id)? else {
            return Ok(Outcome::not_found());
        };
        let delta = amount_cents - rule.amount_cents;
        if rule.active && delta > 0 && !can_afford(tx, user, delta)? {
            return Ok(Outcome::insufficient());
        }
        tx.execute(
            "UPDATE recurring_allocations
             SET amount_cents=?1, description=COALESCE(?2, description), updated_at=datetime('now')
             WHERE id=?3 AND user_id=?4",
            params![amount_cents, description, id, user],
        )?;
        tracing::debug!(user, id, amount_cents, "recurring rule updated");
        Ok(Outcome::created(id))
    })
}

pub fn set_recurring_active_by_id(
    conn: &mut Connection,
    user: &str,
    id: i64,
    active: bool,
) -> Result<Outcome> {
    atomically(conn, |tx| {
        let Some(rule) = rule_by_id(tx, user, id)? else {
            return Ok(Outcome::not_found());
        };
        if active && !rule.active && !can_afford(tx, user, rule.amount_cents)? {
            return Ok(Outcome::insufficient());
        }
        tx.execute(
            "UPDATE recurring_allocations SET active=?1, updated_at=datetime('now')
             WHERE id=?2 AND user_id=?3",
            params![active, id, user],
        )?;
        Ok(Outcome::created(id))
    })
}

pub fn delete_recurring(conn: &Connection, user: &str, id: i64) -> Result<Outcome> {
    let n = conn.execute(
        "DELETE FROM recurring_allocations WHERE id=?1 AND user_id=?2",
        params![id, user],
    )?;
    if n == 0 {
        return Ok(Outcome::not_found());
    }
    tracing::debug!(user, id, "recurring rule deleted");
    Ok(Outcome::ok())
}

pub fn list_recurring(
    conn: &Connection,
    user: &str,
    kind: Option<Kind>,
) -> Result<Vec<RecurringAllocation>> {
    match kind {
        Some(k) => {
            let sql = format!(
                "SELECT {RULE_COLUMNS} FROM recurring_allocations
                 WHERE user_id=?1 AND kind=?2 ORDER BY id"
            );
            read_rules(conn, &sql, params![user, k.as_str()])
        }
        None => {
            let sql = format!(
                "SELECT {RULE_COLUMNS} FROM recurring_allocations
                 WHERE user_id=?1 ORDER BY kind, id"
            );
            read_rules(conn, &sql, params![user])
        }
    }
}
