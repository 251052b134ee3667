// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Input validation errors.
//!
//! These are raised before any database access. Infrastructure failures are
//! plain [`anyhow::Error`]s and guard rejections are
//! [`Outcome`](crate::models::Outcome)s, so neither appears here.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("Amount must be positive (got {0})")]
    NonPositiveAmount(String),
    #[error("`{0}` must not be blank")]
    BlankField(&'static str),
    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("Unknown kind '{0}', expected savings|investment|spend")]
    UnknownKind(String),
    #[error("Unknown record kind '{0}', expected income|expense|savings|investment")]
    UnknownRecordKind(String),
}
