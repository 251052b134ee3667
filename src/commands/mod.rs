// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod config;
pub mod doctor;
pub mod exporter;
pub mod records;
pub mod recurring;
pub mod summary;

use crate::models::{Outcome, Reason};
use crate::utils::{parse_amount, parse_month, parse_non_negative, to_cents};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use thiserror::Error;

/// An action the library refused. `main` maps it to exit status 2.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({reason})")]
pub struct Rejected {
    pub reason: Reason,
    pub message: String,
}

pub(crate) fn check_outcome(outcome: &Outcome, what: &str) -> Result<()> {
    if outcome.ok {
        return Ok(());
    }
    let reason = outcome.reason.unwrap_or(Reason::InsufficientBalance);
    let message = match reason {
        Reason::InsufficientBalance => format!("Not enough balance to {}", what),
        Reason::NotFound => format!("Nothing to {}", what),
    };
    Err(Rejected { reason, message }.into())
}

pub(crate) fn amount_cents(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("amount").context("--amount missing")?;
    to_cents(Some(parse_amount(raw)?))
}

pub(crate) fn amount_cents_allow_zero(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("amount").context("--amount missing")?;
    to_cents(Some(parse_non_negative(raw)?))
}

pub(crate) fn id_arg(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("id").context("--id missing")?;
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", raw.trim()))
}

pub(crate) fn month_opt(sub: &clap::ArgMatches) -> Result<Option<NaiveDate>> {
    match sub.get_one::<String>("month") {
        Some(m) => Ok(Some(parse_month(m)?)),
        None => Ok(None),
    }
}
