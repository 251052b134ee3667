// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Profiles and monthly periods.
//!
//! Both are created lazily through idempotent upserts. The unique keys
//! (`profiles.id`, `periods(user_id, month_start)`) are the only coordination
//! between concurrent callers.

use crate::models::{Period, PeriodId};
use crate::utils::{month_start, require_text, today};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, params};

pub fn ensure_profile(conn: &Connection, user: &str) -> Result<()> {
    let user = require_text("user", user)?;
    conn.execute(
        "INSERT INTO profiles(id) VALUES (?1) ON CONFLICT(id) DO NOTHING",
        params![user],
    )
    .map_err(|err| {
        tracing::error!(user = %user, "error creating profile: {err}");
        err
    })
    .context("Failed to create profile")?;
    Ok(())
}

/// Id of the period covering `date` (today when `None`), created if absent.
pub fn ensure_period(conn: &Connection, user: &str, date: Option<NaiveDate>) -> Result<PeriodId> {
    let start = month_start(date.unwrap_or_else(today));
    let inserted = conn
        .execute(
            "INSERT INTO periods(user_id, month_start) VALUES (?1, ?2)
             ON CONFLICT(user_id, month_start) DO NOTHING",
            params![user, start.to_string()],
        )
        .map_err(|err| {
            tracing::error!(user, month_start = %start, "error creating period: {err}");
            err
        })
        .context("Failed to create period")?;
    if inserted > 0 {
        tracing::debug!(user, month_start = %start, "created period");
    }
    let id: PeriodId = conn
        .query_row(
            "SELECT id FROM periods WHERE user_id=?1 AND month_start=?2",
            params![user, start.to_string()],
            |r| r.get(0),
        )
        .with_context(|| format!("Period {} for '{}' not found", start, user))?;
    Ok(id)
}

pub fn list_periods(conn: &Connection, user: &str) -> Result<Vec<Period>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, month_start FROM periods WHERE user_id=?1 ORDER BY month_start DESC",
    )?;
    let rows = stmt.query_map(params![user], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, user_id, m) = row?;
        let month_start = NaiveDate::parse_from_str(&m, "%Y-%m-%d")
            .with_context(|| format!("Invalid month_start '{}' in periods", m))?;
        out.push(Period {
            id,
            user_id,
            month_start,
        });
    }
    Ok(out)
}
