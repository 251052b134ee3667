// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Leftover", "leftover"));

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("leftover.sqlite"))
}

/// Open the database at `path`, or at the platform data dir when `None`.
pub fn open_or_init(path: Option<&Path>) -> Result<Connection> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    let conn = open_at(&path)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn open_at(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS profiles(
        id TEXT PRIMARY KEY,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS periods(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        month_start TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(user_id, month_start),
        FOREIGN KEY(user_id) REFERENCES profiles(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS recurring_allocations(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('savings','investment','spend')),
        description TEXT,
        amount_cents INTEGER NOT NULL DEFAULT 0,
        active INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(user_id) REFERENCES profiles(id) ON DELETE CASCADE
    );
    -- one unnamed rule per (user, kind); named rules are unbounded
    CREATE UNIQUE INDEX IF NOT EXISTS idx_recurring_unnamed
        ON recurring_allocations(user_id, kind) WHERE description IS NULL;

    CREATE TABLE IF NOT EXISTS incomes(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        period_id INTEGER NOT NULL,
        amount_cents INTEGER NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(user_id) REFERENCES profiles(id) ON DELETE CASCADE,
        FOREIGN KEY(period_id) REFERENCES periods(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_incomes_period ON incomes(period_id);

    CREATE TABLE IF NOT EXISTS expenses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        period_id INTEGER NOT NULL,
        amount_cents INTEGER NOT NULL,
        merchant TEXT NOT NULL,
        category TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(user_id) REFERENCES profiles(id) ON DELETE CASCADE,
        FOREIGN KEY(period_id) REFERENCES periods(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_expenses_period ON expenses(period_id);

    CREATE TABLE IF NOT EXISTS savings_transfers(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        period_id INTEGER NOT NULL,
        amount_cents INTEGER NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(user_id) REFERENCES profiles(id) ON DELETE CASCADE,
        FOREIGN KEY(period_id) REFERENCES periods(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_savings_period ON savings_transfers(period_id);

    CREATE TABLE IF NOT EXISTS investment_trades(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        period_id INTEGER NOT NULL,
        amount_cents INTEGER NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(user_id) REFERENCES profiles(id) ON DELETE CASCADE,
        FOREIGN KEY(period_id) REFERENCES periods(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_trades_period ON investment_trades(period_id);

    CREATE VIEW IF NOT EXISTS v_month_totals AS
    SELECT
        p.id AS period_id,
        p.user_id AS user_id,
        p.month_start AS month_start,
        COALESCE((SELECT SUM(amount_cents) FROM incomes WHERE period_id=p.id), 0) AS income_cents,
        COALESCE((SELECT SUM(amount_cents) FROM expenses WHERE period_id=p.id), 0) AS expense_cents,
        COALESCE((SELECT SUM(amount_cents) FROM savings_transfers WHERE period_id=p.id), 0) AS savings_oneoff_cents,
        COALESCE((SELECT SUM(amount_cents) FROM investment_trades WHERE period_id=p.id), 0) AS invest_oneoff_cents
    FROM periods p;
    "#,
    )?;
    Ok(())
}
