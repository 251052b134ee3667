// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::month_opt;
use crate::models::RecordKind;
use crate::records::list_records;
use crate::utils::{from_cents, month_start, today};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::json;
use std::path::Path;

pub fn handle(conn: &Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "csv".into());
    let out = sub.get_one::<String>("out").context("--out missing")?.trim();
    let month = month_opt(sub)?.unwrap_or_else(today);
    let n = export_month(conn, user, month, &fmt, Path::new(out))?;
    println!("Exported {} records to {}", n, out);
    Ok(())
}

/// Write every record of the month containing `month`, oldest first.
pub fn export_month(
    conn: &Connection,
    user: &str,
    month: NaiveDate,
    fmt: &str,
    out: &Path,
) -> Result<usize> {
    let start = month_start(month);
    let mut rows = Vec::new();
    for kind in RecordKind::ALL {
        rows.extend(list_records(conn, user, kind, Some(start))?);
    }
    rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out.display()))?;
            wtr.write_record(["month", "kind", "id", "created_at", "amount", "label", "category"])?;
            for r in &rows {
                wtr.write_record([
                    start.format("%Y-%m").to_string(),
                    r.kind.to_string(),
                    r.id.to_string(),
                    r.created_at.clone(),
                    format!("{:.2}", from_cents(Some(r.amount_cents))),
                    r.label.clone().unwrap_or_default(),
                    r.category.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|r| {
                    json!({
                        "month": start.format("%Y-%m").to_string(),
                        "kind": r.kind,
                        "id": r.id,
                        "created_at": r.created_at,
                        "amount_cents": r.amount_cents,
                        "label": r.label,
                        "category": r.category,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Write {}", out.display()))?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    tracing::debug!(user, count = rows.len(), path = %out.display(), "exported");
    Ok(rows.len())
}
