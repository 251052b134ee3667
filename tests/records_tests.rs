// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use leftover::models::{Kind, Reason, RecordKind};
use leftover::{InputError, db, period, records, recurring, summary};
use rusqlite::{Connection, params};
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::tempdir;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

const USER: &str = "alice";

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    period::ensure_profile(&conn, USER).unwrap();
    conn
}

#[derive(Clone, Default)]
struct LogSink(Arc<Mutex<Vec<u8>>>);

struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter(Arc::clone(&self.0))
    }
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn captured_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let sink = LogSink::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .with_ansi(false)
        .with_max_level(Level::WARN)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
    (out, text)
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .unwrap()
}

#[test]
fn ensure_period_is_idempotent_per_month() {
    let conn = setup();
    let a = period::ensure_period(&conn, USER, NaiveDate::from_ymd_opt(2025, 3, 2)).unwrap();
    let b = period::ensure_period(&conn, USER, NaiveDate::from_ymd_opt(2025, 3, 31)).unwrap();
    let c = period::ensure_period(&conn, USER, NaiveDate::from_ymd_opt(2025, 4, 1)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(count(&conn, "periods"), 2);

    let periods = period::list_periods(&conn, USER).unwrap();
    assert_eq!(periods[0].month_start, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
    assert_eq!(periods[1].month_start, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
}

#[test]
fn ensure_profile_is_idempotent_and_period_needs_it() {
    let conn = setup();
    period::ensure_profile(&conn, USER).unwrap();
    assert_eq!(count(&conn, "profiles"), 1);

    let err = period::ensure_period(&conn, "ghost", None).unwrap_err();
    assert!(err.to_string().contains("Failed to create period"));
    assert!(period::ensure_profile(&conn, "  ").is_err());
}

#[test]
fn rejected_expense_leaves_database_unchanged() {
    let mut conn = setup();
    records::add_income(&mut conn, USER, 1_000, None).unwrap();
    let before = (count(&conn, "expenses"), count(&conn, "periods"));

    let out = records::add_expense(&mut conn, USER, "Bikes", 1_001, None).unwrap();
    assert!(!out.ok);
    assert_eq!(out.reason, Some(Reason::InsufficientBalance));
    assert_eq!(out.id, None);
    assert_eq!((count(&conn, "expenses"), count(&conn, "periods")), before);
}

#[test]
fn guarded_records_reduce_remaining_by_their_amount() {
    let mut conn = setup();
    records::add_income(&mut conn, USER, 10_000, None).unwrap();

    let mut expected = 10_000;
    for (kind, amount) in [
        (RecordKind::Expense, 1_234),
        (RecordKind::Savings, 2_000),
        (RecordKind::Investment, 3_000),
    ] {
        let out = match kind {
            RecordKind::Expense => {
                records::add_expense(&mut conn, USER, "Cafe", amount, Some("food")).unwrap()
            }
            RecordKind::Savings => {
                records::add_savings_transfer(&mut conn, USER, amount, None).unwrap()
            }
            _ => records::add_investment_trade(&mut conn, USER, amount, Some("VTI")).unwrap(),
        };
        assert!(out.ok, "{kind} rejected");
        expected -= amount;
        assert_eq!(
            summary::fetch_summary(&conn, USER).unwrap().remaining_cents,
            expected
        );
    }

    let savings = records::add_savings_transfer(&mut conn, USER, expected + 1, None).unwrap();
    assert_eq!(savings.reason, Some(Reason::InsufficientBalance));
    let trade = records::add_investment_trade(&mut conn, USER, expected + 1, None).unwrap();
    assert_eq!(trade.reason, Some(Reason::InsufficientBalance));
}

#[test]
fn income_with_no_balance_is_never_guarded() {
    let mut conn = setup();
    let out = records::add_income(&mut conn, USER, 1, Some("  ")).unwrap();
    assert!(out.ok);
    let incomes = records::get_incomes(&conn, USER).unwrap();
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].label, None);
}

#[test]
fn deleting_expense_restores_balance() {
    let mut conn = setup();
    records::add_income(&mut conn, USER, 5_000, None).unwrap();
    let id = records::add_expense(&mut conn, USER, "Books", 2_000, None)
        .unwrap()
        .id
        .unwrap();
    assert_eq!(summary::fetch_summary(&conn, USER).unwrap().remaining_cents, 3_000);

    assert!(records::delete_record(&conn, USER, RecordKind::Expense, id).unwrap().ok);
    assert_eq!(summary::fetch_summary(&conn, USER).unwrap().remaining_cents, 5_000);

    let again = records::delete_record(&conn, USER, RecordKind::Expense, id).unwrap();
    assert_eq!(again.reason, Some(Reason::NotFound));
}

#[test]
fn deleting_income_is_allowed_even_when_it_overdraws() {
    let mut conn = setup();
    let income = records::add_income(&mut conn, USER, 5_000, None).unwrap().id.unwrap();
    records::add_expense(&mut conn, USER, "Rent", 4_000, None).unwrap();

    assert!(records::delete_record(&conn, USER, RecordKind::Income, income).unwrap().ok);
    let s = summary::fetch_summary(&conn, USER).unwrap();
    assert_eq!(s.remaining_cents, -4_000);

    // every later guarded action sees the hole
    let out = records::add_expense(&mut conn, USER, "Snack", 1, None).unwrap();
    assert_eq!(out.reason, Some(Reason::InsufficientBalance));
    let out = records::add_expense(&mut conn, USER, "Jet", i64::MAX, None).unwrap();
    assert_eq!(out.reason, Some(Reason::InsufficientBalance));
    let out = records::add_savings_transfer(&mut conn, USER, 1, None).unwrap();
    assert_eq!(out.reason, Some(Reason::InsufficientBalance));
    let out = records::add_investment_trade(&mut conn, USER, i64::MAX - 1, None).unwrap();
    assert_eq!(out.reason, Some(Reason::InsufficientBalance));
    let out = recurring::set_recurring_active(&mut conn, USER, Kind::Spend, true).unwrap();
    assert_eq!(out.reason, Some(Reason::InsufficientBalance));
    let out = recurring::add_recurring(&mut conn, USER, Kind::Savings, i64::MAX, "Moon").unwrap();
    assert_eq!(out.reason, Some(Reason::InsufficientBalance));

    assert_eq!(count(&conn, "expenses"), 1);
    assert_eq!(count(&conn, "savings_transfers"), 0);
    assert_eq!(count(&conn, "investment_trades"), 0);
    assert_eq!(count(&conn, "recurring_allocations"), 0);
    assert_eq!(summary::fetch_summary(&conn, USER).unwrap().remaining_cents, -4_000);
}

#[test]
fn deleting_past_income_warns_about_that_month() {
    let conn = setup();
    let month = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let period_id = period::ensure_period(&conn, USER, Some(month)).unwrap();
    conn.execute(
        "INSERT INTO incomes(user_id, period_id, amount_cents) VALUES (?1, ?2, 1000)",
        params![USER, period_id],
    )
    .unwrap();
    let income = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO expenses(user_id, period_id, amount_cents, merchant) VALUES (?1, ?2, 800, 'Old')",
        params![USER, period_id],
    )
    .unwrap();

    let (out, logs) =
        captured_warnings(|| records::delete_record(&conn, USER, RecordKind::Income, income));
    assert!(out.unwrap().ok);
    assert!(logs.contains("remaining balance is now negative"), "{logs}");
    assert!(logs.contains("2024-01"), "{logs}");
    assert_eq!(
        summary::summary_for_month(&conn, USER, month).unwrap().remaining_cents,
        -800
    );

    // a covered deletion stays quiet
    let mut conn = setup();
    records::add_income(&mut conn, USER, 500, None).unwrap();
    let spare = records::add_income(&mut conn, USER, 100, None).unwrap().id.unwrap();
    let (_, logs) =
        captured_warnings(|| records::delete_record(&conn, USER, RecordKind::Income, spare));
    assert!(logs.is_empty(), "{logs}");
}

#[test]
fn list_records_is_scoped_to_month_kind_and_user() {
    let mut conn = setup();
    records::add_income(&mut conn, USER, 9_000, None).unwrap();
    records::add_expense(&mut conn, USER, "Starbucks", 450, Some("coffee")).unwrap();
    records::add_expense(&mut conn, USER, "Bakery", 300, None).unwrap();
    period::ensure_profile(&conn, "bob").unwrap();
    records::add_income(&mut conn, "bob", 100, None).unwrap();
    records::add_expense(&mut conn, "bob", "Elsewhere", 50, None).unwrap();

    let rows = records::list_records(&conn, USER, RecordKind::Expense, None).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label.as_deref(), Some("Bakery"));
    assert_eq!(rows[1].category.as_deref(), Some("coffee"));
    assert!(rows.iter().all(|r| r.kind == RecordKind::Expense));

    let old = NaiveDate::from_ymd_opt(2019, 6, 1);
    assert!(records::list_records(&conn, USER, RecordKind::Expense, old).unwrap().is_empty());
}

#[test]
fn invalid_amounts_and_blank_merchant_are_input_errors() {
    let mut conn = setup();
    let err = records::add_expense(&mut conn, USER, " ", 100, None).unwrap_err();
    assert_eq!(
        err.downcast_ref::<InputError>(),
        Some(&InputError::BlankField("merchant"))
    );
    let err = records::add_income(&mut conn, USER, 0, None).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::NonPositiveAmount(_))
    ));
    assert_eq!(count(&conn, "incomes"), 0);
    assert_eq!(count(&conn, "periods"), 0);
}

#[test]
fn concurrent_guarded_writers_cannot_overdraw() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("race.sqlite");

    let mut conn = db::open_at(&path).unwrap();
    period::ensure_profile(&conn, USER).unwrap();
    records::add_income(&mut conn, USER, 1_000, None).unwrap();

    let handles: Vec<_> = (0..2)
        .map(|i| {
            let mut c = db::open_at(&path).unwrap();
            thread::spawn(move || {
                records::add_expense(&mut c, USER, &format!("racer {i}"), 600, None).unwrap()
            })
        })
        .collect();
    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(outcomes.iter().filter(|o| o.ok).count(), 1);
    assert_eq!(
        outcomes.iter().filter(|o| o.reason == Some(Reason::InsufficientBalance)).count(),
        1
    );
    let s = summary::fetch_summary(&conn, USER).unwrap();
    assert_eq!(s.expense_cents, 600);
    assert_eq!(s.remaining_cents, 400);
}
