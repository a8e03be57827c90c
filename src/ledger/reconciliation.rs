//! A dated snapshot reconciling bank balances against envelope balances.

use std::{collections::HashSet, fmt};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{currency, errors::LedgerError};

use super::{
    account::BankAccount, bucket::BucketCode, entry::LedgerEntry, transaction::LedgerTransaction,
};

/// Lifecycle of a reconciliation. Moves from `Draft` to `Committed` once, never back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReconciliationState {
    #[default]
    Draft,
    Committed,
}

impl fmt::Display for ReconciliationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReconciliationState::Draft => "Draft",
            ReconciliationState::Committed => "Committed",
        };
        f.write_str(label)
    }
}

/// Statement balance of one bank account on the reconciliation date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BankBalance {
    pub account: BankAccount,
    pub balance: Decimal,
}

impl BankBalance {
    pub fn new(account: BankAccount, balance: Decimal) -> Self {
        Self { account, balance }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reconciliation {
    date: NaiveDate,
    remarks: String,
    bank_balances: Vec<BankBalance>,
    adjustments: Vec<LedgerTransaction>,
    entries: Vec<LedgerEntry>,
    state: ReconciliationState,
}

impl Reconciliation {
    /// Assembles a new draft reconciliation from fully-formed parts.
    pub fn new(
        date: NaiveDate,
        remarks: impl Into<String>,
        bank_balances: Vec<BankBalance>,
        adjustments: Vec<LedgerTransaction>,
        entries: Vec<LedgerEntry>,
    ) -> Result<Self, LedgerError> {
        let reconciliation = Self {
            date,
            remarks: remarks.into(),
            bank_balances,
            adjustments,
            entries,
            state: ReconciliationState::Draft,
        };
        reconciliation.check()?;
        Ok(reconciliation)
    }

    /// Rebuilds a persisted reconciliation. Persisted history is always committed.
    pub fn restore(
        date: NaiveDate,
        remarks: impl Into<String>,
        bank_balances: Vec<BankBalance>,
        adjustments: Vec<LedgerTransaction>,
        entries: Vec<LedgerEntry>,
    ) -> Result<Self, LedgerError> {
        let reconciliation = Self {
            date,
            remarks: remarks.into(),
            bank_balances,
            adjustments,
            entries,
            state: ReconciliationState::Committed,
        };
        reconciliation.check().map_err(|err| match err {
            LedgerError::InvalidInput(message)
            | LedgerError::DuplicateBankBalance(message)
            | LedgerError::UnknownAccount(message) => LedgerError::CorruptDocument(format!(
                "reconciliation {date}: {message}"
            )),
            other => other,
        })?;
        Ok(reconciliation)
    }

    fn check(&self) -> Result<(), LedgerError> {
        if self.bank_balances.is_empty() {
            return Err(LedgerError::InvalidInput(
                "a reconciliation needs at least one bank balance".into(),
            ));
        }
        let mut accounts = HashSet::new();
        for balance in &self.bank_balances {
            if !accounts.insert(balance.account.code.as_str()) {
                return Err(LedgerError::DuplicateBankBalance(
                    balance.account.code.clone(),
                ));
            }
        }
        for adjustment in &self.adjustments {
            let account = adjustment.adjusted_account().ok_or_else(|| {
                LedgerError::InvalidInput(format!(
                    "transaction {} is not a bank balance adjustment",
                    adjustment.id()
                ))
            })?;
            if !accounts.contains(account.code.as_str()) {
                return Err(LedgerError::UnknownAccount(account.code.clone()));
            }
        }
        let mut buckets = HashSet::new();
        for entry in &self.entries {
            if !buckets.insert(entry.bucket()) {
                return Err(LedgerError::InvalidInput(format!(
                    "bucket {} appears more than once",
                    entry.bucket()
                )));
            }
        }
        if !buckets.contains(&BucketCode::surplus()) {
            return Err(LedgerError::InvalidInput(
                "reconciliation has no surplus entry".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn commit(&mut self) {
        self.state = ReconciliationState::Committed;
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    pub fn bank_balances(&self) -> &[BankBalance] {
        &self.bank_balances
    }

    pub fn adjustments(&self) -> &[LedgerTransaction] {
        &self.adjustments
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn state(&self) -> ReconciliationState {
        self.state
    }

    pub fn is_draft(&self) -> bool {
        self.state == ReconciliationState::Draft
    }

    pub fn entry(&self, bucket: &BucketCode) -> Option<&LedgerEntry> {
        self.entries.iter().find(|entry| entry.bucket() == bucket)
    }

    pub fn surplus_entry(&self) -> Option<&LedgerEntry> {
        self.entries.iter().find(|entry| entry.is_surplus())
    }

    /// Sum of the raw statement balances, before adjustments.
    pub fn statement_balance(&self) -> Decimal {
        currency::sum(self.bank_balances.iter().map(|b| b.balance))
    }

    pub fn total_adjustments(&self) -> Decimal {
        currency::sum(self.adjustments.iter().map(|t| t.amount()))
    }

    /// Total bank balance across all accounts with adjustments applied.
    pub fn total_bank_balance(&self) -> Decimal {
        self.statement_balance() + self.total_adjustments()
    }

    /// Balance of one account with its adjustments applied.
    pub fn adjusted_balance(&self, account_code: &str) -> Option<Decimal> {
        let balance = self
            .bank_balances
            .iter()
            .find(|b| b.account.code == account_code)?
            .balance;
        let adjustments = currency::sum(
            self.adjustments
                .iter()
                .filter(|t| {
                    t.adjusted_account()
                        .map(|account| account.code == account_code)
                        .unwrap_or(false)
                })
                .map(|t| t.amount()),
        );
        Some(balance + adjustments)
    }

    pub fn allocated_balance(&self) -> Decimal {
        currency::sum(
            self.entries
                .iter()
                .filter(|entry| !entry.is_surplus())
                .map(|entry| entry.balance()),
        )
    }

    /// Funds not allocated to any envelope. May be negative when the envelopes are over-committed.
    pub fn calculated_surplus(&self) -> Decimal {
        self.total_bank_balance() - self.allocated_balance()
    }

    pub fn tracks_account(&self, account_code: &str) -> bool {
        self.bank_balances
            .iter()
            .any(|b| b.account.code == account_code)
    }
}
