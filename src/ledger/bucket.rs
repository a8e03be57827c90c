//! Ledger bucket definitions: which envelope, where its money lives, how it accumulates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::account::BankAccount;

/// Code of the single catch-all envelope holding unallocated funds.
pub const SURPLUS_CODE: &str = "SURPLUS";

/// Budget category code identifying one envelope. Codes are case-insensitive and stored upper-case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct BucketCode(String);

impl BucketCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    pub fn surplus() -> Self {
        Self(SURPLUS_CODE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_surplus(&self) -> bool {
        self.0 == SURPLUS_CODE
    }
}

impl fmt::Display for BucketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BucketCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// How an envelope's balance behaves from one reconciliation to the next.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccumulationPolicy {
    /// Savings style: unspent balance carries forward.
    Accumulate,
    /// Spend-per-period: the balance is reset to the budgeted amount each reconciliation.
    ResetEachPeriod,
    /// The derived residual of all funds not allocated elsewhere.
    Surplus,
}

impl fmt::Display for AccumulationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccumulationPolicy::Accumulate => "Accumulate",
            AccumulationPolicy::ResetEachPeriod => "Reset Each Period",
            AccumulationPolicy::Surplus => "Surplus",
        };
        f.write_str(label)
    }
}

/// Maps a budget envelope to the bank account it is stored in and its accumulation policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerBucket {
    pub code: BucketCode,
    pub stored_in: BankAccount,
    pub policy: AccumulationPolicy,
    #[serde(default = "LedgerBucket::active_default")]
    pub active: bool,
}

impl LedgerBucket {
    pub fn new(code: impl Into<BucketCode>, stored_in: BankAccount, policy: AccumulationPolicy) -> Self {
        Self {
            code: code.into(),
            stored_in,
            policy,
            active: true,
        }
    }

    pub fn accumulating(code: impl Into<BucketCode>, stored_in: BankAccount) -> Self {
        Self::new(code, stored_in, AccumulationPolicy::Accumulate)
    }

    pub fn reset_each_period(code: impl Into<BucketCode>, stored_in: BankAccount) -> Self {
        Self::new(code, stored_in, AccumulationPolicy::ResetEachPeriod)
    }

    pub fn surplus(stored_in: BankAccount) -> Self {
        Self::new(BucketCode::surplus(), stored_in, AccumulationPolicy::Surplus)
    }

    pub fn is_surplus(&self) -> bool {
        self.policy == AccumulationPolicy::Surplus
    }

    /// Surplus never receives a budgeted credit; its balance is always derived.
    pub fn receives_budget_credit(&self) -> bool {
        !self.is_surplus()
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    fn active_default() -> bool {
        true
    }
}

impl From<String> for BucketCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::AccountKind;

    #[test]
    fn codes_are_normalised() {
        assert_eq!(BucketCode::new(" power "), BucketCode::new("POWER"));
        assert!(BucketCode::new("surplus").is_surplus());
    }

    #[test]
    fn surplus_bucket_never_budgeted() {
        let cheque = BankAccount::new("CHEQUE", "Cheque", AccountKind::Cheque);
        assert!(!LedgerBucket::surplus(cheque.clone()).receives_budget_credit());
        assert!(LedgerBucket::accumulating("CAR", cheque).receives_budget_credit());
    }
}
