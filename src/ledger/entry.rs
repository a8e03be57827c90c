//! One envelope's running balance and transaction history within a single reconciliation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{currency, errors::LedgerError};

use super::{bucket::BucketCode, transaction::LedgerTransaction};

/// Narrative stamped on the credit that absorbs a negative balance.
pub const SHORTFALL_NARRATIVE: &str = "Shortfall absorbed: envelope balance cannot go below zero";
/// Narrative stamped on the adjustment that resets a spend-per-period envelope.
pub const RESET_NARRATIVE: &str = "Balance reset to budgeted amount";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    bucket: BucketCode,
    opening_balance: Decimal,
    transactions: Vec<LedgerTransaction>,
    balance: Decimal,
}

impl LedgerEntry {
    /// Builds an envelope entry whose balance is `opening + Σ amounts`.
    ///
    /// Fails when the resulting balance is negative; callers absorb shortfalls first.
    pub fn new(
        bucket: BucketCode,
        opening_balance: Decimal,
        transactions: Vec<LedgerTransaction>,
    ) -> Result<Self, LedgerError> {
        if bucket.is_surplus() {
            return Err(LedgerError::InvalidInput(
                "surplus entries carry a derived balance".into(),
            ));
        }
        let balance = opening_balance + currency::sum(transactions.iter().map(|t| t.amount()));
        let entry = Self {
            bucket,
            opening_balance,
            transactions,
            balance,
        };
        entry.check().map_err(LedgerError::InvalidInput)?;
        Ok(entry)
    }

    /// Builds the surplus entry. Its balance is the residual computed by the reconciliation.
    pub fn surplus(
        opening_balance: Decimal,
        transactions: Vec<LedgerTransaction>,
        balance: Decimal,
    ) -> Result<Self, LedgerError> {
        let entry = Self {
            bucket: BucketCode::surplus(),
            opening_balance,
            transactions,
            balance,
        };
        entry.check().map_err(LedgerError::InvalidInput)?;
        Ok(entry)
    }

    /// Rebuilds a persisted entry, verifying its balance invariants.
    pub fn restore(
        bucket: BucketCode,
        opening_balance: Decimal,
        transactions: Vec<LedgerTransaction>,
        balance: Decimal,
    ) -> Result<Self, LedgerError> {
        let entry = Self {
            bucket,
            opening_balance,
            transactions,
            balance,
        };
        entry.check().map_err(LedgerError::CorruptDocument)?;
        Ok(entry)
    }

    fn check(&self) -> Result<(), String> {
        if self.balance.is_sign_negative() && !self.balance.is_zero() {
            return Err(format!(
                "entry for {} has negative balance {}",
                self.bucket, self.balance
            ));
        }
        if self.transactions.iter().any(|t| t.adjusted_account().is_some()) {
            return Err(format!(
                "entry for {} holds a bank balance adjustment",
                self.bucket
            ));
        }
        if !self.bucket.is_surplus() {
            let expected = self.opening_balance + self.net_change();
            if expected != self.balance {
                return Err(format!(
                    "entry for {} has balance {} but opening plus transactions is {}",
                    self.bucket, self.balance, expected
                ));
            }
        }
        Ok(())
    }

    pub fn bucket(&self) -> &BucketCode {
        &self.bucket
    }

    pub fn opening_balance(&self) -> Decimal {
        self.opening_balance
    }

    pub fn transactions(&self) -> &[LedgerTransaction] {
        &self.transactions
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn net_change(&self) -> Decimal {
        currency::sum(self.transactions.iter().map(|t| t.amount()))
    }

    pub fn budgeted_credit(&self) -> Decimal {
        currency::sum(
            self.transactions
                .iter()
                .filter(|t| t.is_budget_credit())
                .map(|t| t.amount()),
        )
    }

    /// True when spending exceeded the available funds and the shortfall was absorbed.
    pub fn absorbed_shortfall(&self) -> bool {
        self.transactions
            .iter()
            .any(|t| t.narrative() == SHORTFALL_NARRATIVE)
    }

    pub fn is_surplus(&self) -> bool {
        self.bucket.is_surplus()
    }
}
