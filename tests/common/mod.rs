#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use budget_ledger::{
    core::ReconciliationRequest,
    ledger::{
        AccountKind, BankAccount, BudgetPlan, LedgerBook, LedgerBucket, StatementTransaction,
    },
    storage::JsonStorage,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated storage backend in a unique directory.
pub fn setup_storage() -> (JsonStorage, PathBuf) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    let storage = JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage");
    (storage, base)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn cheque() -> BankAccount {
    BankAccount::new("CHEQUE", "Cheque account", AccountKind::Cheque)
}

pub fn savings() -> BankAccount {
    BankAccount::new("SAVINGS", "Savings account", AccountKind::Savings)
}

fn line(bucket: &str, amount: Decimal, on: NaiveDate, description: &str) -> StatementTransaction {
    StatementTransaction::new(bucket, "CHEQUE", amount, on, description)
}

pub fn household_plan() -> BudgetPlan {
    BudgetPlan::monthly()
        .with("HAIRCUT", dec!(55))
        .with("POWER", dec!(140))
        .with("PHONE", dec!(95))
}

/// Haircut, power (accumulating) and phone (reset each period), all stored in the cheque account.
pub fn household_book() -> LedgerBook {
    let mut book = LedgerBook::new("Household", cheque());
    book.register_bucket(LedgerBucket::accumulating("HAIRCUT", cheque()))
        .expect("register haircut");
    book.register_bucket(LedgerBucket::accumulating("POWER", cheque()))
        .expect("register power");
    book.register_bucket(LedgerBucket::reset_each_period("PHONE", cheque()))
        .expect("register phone");
    book
}

pub fn three_period_statement() -> Vec<StatementTransaction> {
    vec![
        line("HAIRCUT", dec!(-45), date(2013, 6, 5), "Barber"),
        line("POWER", dec!(-123.56), date(2013, 6, 8), "Power bill"),
        line("PHONE", dec!(-86.43), date(2013, 6, 10), "Phone bill"),
        line("POWER", dec!(-145.50), date(2013, 7, 1), "Power bill"),
        line("PHONE", dec!(-64.71), date(2013, 7, 2), "Phone bill"),
        line("HAIRCUT", dec!(-60), date(2013, 7, 25), "Barber"),
        line("POWER", dec!(-210), date(2013, 8, 2), "Power bill"),
        line("PHONE", dec!(-86.43), date(2013, 8, 3), "Phone bill"),
    ]
}

/// June, July and August 2013 against a single cheque account.
pub fn three_period_book() -> LedgerBook {
    let mut book = household_book();
    let plan = household_plan();
    let statement = three_period_statement();
    for (on, balance) in [
        (date(2013, 6, 15), dec!(2500)),
        (date(2013, 7, 15), dec!(3700)),
        (date(2013, 8, 15), dec!(3300)),
    ] {
        book.reconcile(
            &ReconciliationRequest::new(on).with_balance(cheque(), balance),
            &plan,
            &statement,
        )
        .expect("reconcile three-period fixture");
    }
    book
}

pub fn multi_account_plan() -> BudgetPlan {
    household_plan().with("CARMTC", dec!(150))
}

pub fn five_period_statement() -> Vec<StatementTransaction> {
    let mut statement = three_period_statement();
    statement.extend([
        line("SURPLUS", dec!(550), date(2013, 7, 3), "Transfer from savings")
            .with_reference("XFER-0713"),
        StatementTransaction::new(
            "CARMTC",
            "SAVINGS",
            dec!(-289.95),
            date(2013, 8, 20),
            "Car service",
        ),
        line("POWER", dec!(-98.12), date(2013, 9, 1), "Power bill"),
        line("PHONE", dec!(-91.10), date(2013, 9, 2), "Phone bill"),
        line("HAIRCUT", dec!(-55), date(2013, 9, 20), "Barber"),
        line("POWER", dec!(-131.07), date(2013, 10, 1), "Power bill"),
        line("PHONE", dec!(-95), date(2013, 10, 2), "Phone bill"),
        line("SURPLUS", dec!(550), date(2013, 10, 3), "Transfer from savings")
            .with_reference("XFER-0713"),
    ]);
    statement
}

/// Five monthly reconciliations over cheque and savings accounts, with car maintenance
/// stored in savings and a -550 adjustment on the cheque account from July onwards.
pub fn five_period_book() -> LedgerBook {
    let mut book = household_book();
    book.register_bucket(LedgerBucket::accumulating("CARMTC", savings()))
        .expect("register car maintenance");
    let plan = multi_account_plan();
    let statement = five_period_statement();
    let periods = [
        (date(2013, 6, 15), dec!(300), dec!(300), false),
        (date(2013, 7, 15), dec!(700), dec!(450), true),
        (date(2013, 8, 15), dec!(612), dec!(600), true),
        (date(2013, 9, 15), dec!(950), dec!(460.05), true),
        (date(2013, 10, 15), dec!(800), dec!(610.05), true),
    ];
    for (on, cheque_balance, savings_balance, adjusted) in periods {
        let mut request = ReconciliationRequest::new(on)
            .with_balance(cheque(), cheque_balance)
            .with_balance(savings(), savings_balance);
        if adjusted {
            request = request.with_adjustment(cheque(), dec!(-550), "Savings transfer not yet cleared");
        }
        book.reconcile(&request, &plan, &statement)
            .expect("reconcile five-period fixture");
    }
    book
}
