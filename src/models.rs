// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::InputError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type PeriodId = i64;

/// Category of a recurring monthly allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Savings,
    Investment,
    Spend,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Savings, Kind::Investment, Kind::Spend];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Savings => "savings",
            Kind::Investment => "investment",
            Kind::Spend => "spend",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "savings" => Ok(Kind::Savings),
            "investment" | "invest" => Ok(Kind::Investment),
            "spend" => Ok(Kind::Spend),
            other => Err(InputError::UnknownKind(other.to_string())),
        }
    }
}

/// The four one-off record tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Income,
    Expense,
    Savings,
    Investment,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Income,
        RecordKind::Expense,
        RecordKind::Savings,
        RecordKind::Investment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
            RecordKind::Savings => "savings",
            RecordKind::Investment => "investment",
        }
    }

    pub(crate) fn table(&self) -> &'static str {
        match self {
            RecordKind::Income => "incomes",
            RecordKind::Expense => "expenses",
            RecordKind::Savings => "savings_transfers",
            RecordKind::Investment => "investment_trades",
        }
    }

    /// Column holding the free-text label of a row.
    pub(crate) fn label_column(&self) -> &'static str {
        match self {
            RecordKind::Expense => "merchant",
            _ => "note",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(RecordKind::Income),
            "expense" => Ok(RecordKind::Expense),
            "savings" => Ok(RecordKind::Savings),
            "investment" | "invest" => Ok(RecordKind::Investment),
            other => Err(InputError::UnknownRecordKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    InsufficientBalance,
    NotFound,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::InsufficientBalance => f.write_str("INSUFFICIENT_BALANCE"),
            Reason::NotFound => f.write_str("NOT_FOUND"),
        }
    }
}

/// Result of a mutating action. A rejection is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Outcome {
    pub fn ok() -> Self {
        Outcome {
            ok: true,
            reason: None,
            id: None,
        }
    }

    pub fn created(id: i64) -> Self {
        Outcome {
            ok: true,
            reason: None,
            id: Some(id),
        }
    }

    pub fn rejected(reason: Reason) -> Self {
        Outcome {
            ok: false,
            reason: Some(reason),
            id: None,
        }
    }

    pub fn insufficient() -> Self {
        Outcome::rejected(Reason::InsufficientBalance)
    }

    pub fn not_found() -> Self {
        Outcome::rejected(Reason::NotFound)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub user_id: String,
    pub month_start: NaiveDate,
}

/// Month-to-date totals, all in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub income_cents: i64,
    pub expense_cents: i64,
    pub savings_oneoff_cents: i64,
    pub invest_oneoff_cents: i64,
    pub rec_savings_cents: i64,
    pub rec_invest_cents: i64,
    pub rec_spend_cents: i64,
    pub remaining_cents: i64,
    pub month_start: NaiveDate,
}

impl Summary {
    pub fn savings_total(&self) -> i64 {
        self.rec_savings_cents.saturating_add(self.savings_oneoff_cents)
    }

    pub fn invest_total(&self) -> i64 {
        self.rec_invest_cents.saturating_add(self.invest_oneoff_cents)
    }

    pub fn spend_total(&self) -> i64 {
        self.rec_spend_cents.saturating_add(self.expense_cents)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringState {
    pub amount_cents: i64,
    pub active: bool,
}

/// The unnamed recurring rule of each kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringMap {
    pub savings: RecurringState,
    pub investment: RecurringState,
    pub spend: RecurringState,
}

impl RecurringMap {
    pub fn get(&self, kind: Kind) -> &RecurringState {
        match kind {
            Kind::Savings => &self.savings,
            Kind::Investment => &self.investment,
            Kind::Spend => &self.spend,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: Kind) -> &mut RecurringState {
        match kind {
            Kind::Savings => &mut self.savings,
            Kind::Investment => &mut self.investment,
            Kind::Spend => &mut self.spend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringAllocation {
    pub id: i64,
    pub kind: Kind,
    pub description: Option<String>,
    pub amount_cents: i64,
    pub active: bool,
}

/// One row of any of the four record tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub kind: RecordKind,
    pub amount_cents: i64,
    pub label: Option<String>,
    pub category: Option<String>,
    pub created_at: String,
}
