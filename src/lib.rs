// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
mod guard;
pub mod models;
pub mod period;
pub mod records;
pub mod recurring;
pub mod summary;
pub mod utils;

pub use error::InputError;
pub use models::{Kind, Outcome, Reason, RecordKind, RecurringMap, Summary};
pub use period::{ensure_period, ensure_profile};
pub use records::{
    add_expense, add_income, add_investment_trade, add_savings_transfer, delete_record,
    get_incomes, list_records,
};
pub use recurring::{
    add_recurring, delete_recurring, get_recurring, list_recurring, set_recurring_active,
    set_recurring_active_by_id, update_recurring, upsert_recurring,
};
pub use summary::{can_afford, fetch_summary, summary_for_month};
