// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::InputError;
use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Local, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

pub const DEFAULT_USER: &str = "local";
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Round to the nearest minor unit, half away from zero. `None` counts as zero.
pub fn to_cents(amount: Option<Decimal>) -> Result<i64> {
    let amount = amount.unwrap_or(Decimal::ZERO);
    amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|c| c.to_i64())
        .ok_or_else(|| anyhow!("Amount {} is out of range", amount))
}

pub fn from_cents(cents: Option<i64>) -> Decimal {
    Decimal::new(cents.unwrap_or(0), 2)
}

pub fn fmt_cents(cents: i64, symbol: &str) -> String {
    let d = from_cents(Some(cents));
    if d.is_sign_negative() {
        format!("-{}{:.2}", symbol, d.abs())
    } else {
        format!("{}{:.2}", symbol, d)
    }
}

/// Parse a strictly positive decimal amount.
pub fn parse_amount(s: &str) -> Result<Decimal, InputError> {
    let s = s.trim();
    let d = s
        .parse::<Decimal>()
        .map_err(|_| InputError::InvalidAmount(s.to_string()))?;
    if d <= Decimal::ZERO {
        return Err(InputError::NonPositiveAmount(s.to_string()));
    }
    Ok(d)
}

/// Parse a non-negative decimal amount (recurring rules may be set to zero).
pub fn parse_non_negative(s: &str) -> Result<Decimal, InputError> {
    let s = s.trim();
    let d = s
        .parse::<Decimal>()
        .map_err(|_| InputError::InvalidAmount(s.to_string()))?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err(InputError::NonPositiveAmount(s.to_string()));
    }
    Ok(d)
}

pub fn parse_month(s: &str) -> Result<NaiveDate, InputError> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .map_err(|_| InputError::InvalidMonth(s.to_string()))
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Trimmed text, or `BlankField` when nothing is left.
pub fn require_text(field: &'static str, value: &str) -> Result<String, InputError> {
    let v = value.trim();
    if v.is_empty() {
        Err(InputError::BlankField(field))
    } else {
        Ok(v.to_string())
    }
}

/// Trimmed optional text; blank becomes `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()
        .with_context(|| format!("Read setting '{}'", key))?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_default_user(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "default_user")?.unwrap_or_else(|| DEFAULT_USER.to_string()))
}

pub fn set_default_user(conn: &Connection, user: &str) -> Result<()> {
    let user = require_text("user", user)?;
    set_setting(conn, "default_user", &user)
}

pub fn get_currency_symbol(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "currency_symbol")?
        .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()))
}

pub fn set_currency_symbol(conn: &Connection, symbol: &str) -> Result<()> {
    let symbol = require_text("currency", symbol)?;
    set_setting(conn, "currency_symbol", &symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    #[test]
    fn to_cents_rounds_half_away_from_zero() {
        assert_eq!(to_cents(Some(dec("4.50"))).unwrap(), 450);
        assert_eq!(to_cents(Some(dec("0.005"))).unwrap(), 1);
        assert_eq!(to_cents(Some(dec("-0.005"))).unwrap(), -1);
        assert_eq!(to_cents(Some(dec("19.994"))).unwrap(), 1999);
        assert_eq!(to_cents(None).unwrap(), 0);
    }

    #[test]
    fn to_cents_rejects_overflow() {
        assert!(to_cents(Some(Decimal::MAX)).is_err());
    }

    #[test]
    fn integer_cents_survive_conversion() {
        for c in [0_i64, 1, 99, 100, 450, 350_000, -1234, i64::MAX / 1000] {
            assert_eq!(to_cents(Some(from_cents(Some(c)))).unwrap(), c);
        }
        assert_eq!(from_cents(None), Decimal::ZERO);
    }

    #[test]
    fn fmt_cents_places_sign_before_symbol() {
        assert_eq!(fmt_cents(349_550, "$"), "$3495.50");
        assert_eq!(fmt_cents(-500, "$"), "-$5.00");
        assert_eq!(fmt_cents(0, "€"), "€0.00");
    }

    #[test]
    fn parse_amount_requires_positive_number() {
        assert_eq!(parse_amount(" 12.5 ").unwrap(), dec("12.5"));
        assert_eq!(
            parse_amount("0"),
            Err(InputError::NonPositiveAmount("0".into()))
        );
        assert_eq!(
            parse_amount("abc"),
            Err(InputError::InvalidAmount("abc".into()))
        );
        assert!(parse_non_negative("0").is_ok());
        assert!(parse_non_negative("-1").is_err());
    }

    #[test]
    fn month_helpers() {
        let d = NaiveDate::from_ymd_opt(2025, 2, 17).unwrap();
        assert_eq!(month_start(d), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(
            parse_month("2025-02").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
        );
        assert!(parse_month("2025-13").is_err());
    }

    #[test]
    fn require_text_trims() {
        assert_eq!(require_text("merchant", "  Starbucks ").unwrap(), "Starbucks");
        assert_eq!(
            require_text("merchant", "   "),
            Err(InputError::BlankField("merchant"))
        );
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" x ")), Some("x".to_string()));
    }
}
