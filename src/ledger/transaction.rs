//! Immutable ledger transactions recorded against envelopes or bank accounts.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::BankAccount;

/// Discriminates what a ledger transaction represents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionKind {
    /// Periodic contribution from the budget plan.
    BudgetCredit,
    /// Categorized spend, income or manual adjustment.
    CreditDebit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        auto_matching_reference: Option<String>,
    },
    /// Correction against one bank account, not tied to any envelope.
    BankBalanceAdjustment { account: BankAccount },
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::BudgetCredit => "Budget Credit",
            TransactionKind::CreditDebit { .. } => "Credit/Debit",
            TransactionKind::BankBalanceAdjustment { .. } => "Bank Balance Adjustment",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerTransaction {
    id: Uuid,
    amount: Decimal,
    narrative: String,
    date: NaiveDate,
    kind: TransactionKind,
}

impl LedgerTransaction {
    pub fn budget_credit(amount: Decimal, date: NaiveDate, narrative: impl Into<String>) -> Self {
        Self::restore(
            Uuid::new_v4(),
            amount,
            narrative,
            date,
            TransactionKind::BudgetCredit,
        )
    }

    pub fn credit_debit(
        amount: Decimal,
        date: NaiveDate,
        narrative: impl Into<String>,
        auto_matching_reference: Option<String>,
    ) -> Self {
        Self::restore(
            Uuid::new_v4(),
            amount,
            narrative,
            date,
            TransactionKind::CreditDebit {
                auto_matching_reference: auto_matching_reference
                    .map(|reference| reference.trim().to_string())
                    .filter(|reference| !reference.is_empty()),
            },
        )
    }

    pub fn bank_balance_adjustment(
        account: BankAccount,
        amount: Decimal,
        date: NaiveDate,
        narrative: impl Into<String>,
    ) -> Self {
        Self::restore(
            Uuid::new_v4(),
            amount,
            narrative,
            date,
            TransactionKind::BankBalanceAdjustment { account },
        )
    }

    /// Rebuilds a transaction with a known identifier, used when re-linking persisted history.
    pub fn restore(
        id: Uuid,
        amount: Decimal,
        narrative: impl Into<String>,
        date: NaiveDate,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id,
            amount,
            narrative: narrative.into(),
            date,
            kind,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> &TransactionKind {
        &self.kind
    }

    pub fn auto_matching_reference(&self) -> Option<&str> {
        match &self.kind {
            TransactionKind::CreditDebit {
                auto_matching_reference,
            } => auto_matching_reference.as_deref(),
            _ => None,
        }
    }

    pub fn adjusted_account(&self) -> Option<&BankAccount> {
        match &self.kind {
            TransactionKind::BankBalanceAdjustment { account } => Some(account),
            _ => None,
        }
    }

    pub fn is_budget_credit(&self) -> bool {
        matches!(self.kind, TransactionKind::BudgetCredit)
    }
}

impl fmt::Display for LedgerTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} [{}]", self.date, self.amount, self.narrative, self.kind)
    }
}
