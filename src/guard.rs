// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Guard-then-write in one unit.
//!
//! Mutations run inside a `BEGIN IMMEDIATE` transaction: SQLite grants the
//! write lock before the affordability read, so a second writer waits (up to
//! the connection's busy timeout) and then sees the first writer's row.
//! A rejected action rolls back, leaving the database untouched.

use crate::models::Outcome;
use crate::summary::can_afford;
use anyhow::Result;
use rusqlite::{Connection, Transaction, TransactionBehavior};

pub(crate) fn atomically<F>(conn: &mut Connection, f: F) -> Result<Outcome>
where
    F: FnOnce(&Transaction<'_>) -> Result<Outcome>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let outcome = f(&tx)?;
    if outcome.ok {
        tx.commit()?;
    } else {
        tx.rollback()?;
    }
    Ok(outcome)
}

/// Run `write` only if `deduction_cents` is affordable, all under one lock.
pub(crate) fn guarded<F>(
    conn: &mut Connection,
    user: &str,
    deduction_cents: i64,
    write: F,
) -> Result<Outcome>
where
    F: FnOnce(&Transaction<'_>) -> Result<Outcome>,
{
    atomically(conn, |tx| {
        if !can_afford(tx, user, deduction_cents)? {
            return Ok(Outcome::insufficient());
        }
        write(tx)
    })
}
