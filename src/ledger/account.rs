use std::fmt;

use serde::{Deserialize, Serialize};

/// A physical bank account that holds the money behind one or more ledger buckets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BankAccount {
    pub code: String,
    pub name: String,
    pub kind: AccountKind,
}

impl BankAccount {
    pub fn new(code: impl Into<String>, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            code: code.into().trim().to_uppercase(),
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for BankAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// Supported bank account types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccountKind {
    Cheque,
    Savings,
    CreditCard,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountKind::Cheque => "Cheque",
            AccountKind::Savings => "Savings",
            AccountKind::CreditCard => "Credit Card",
        };
        f.write_str(label)
    }
}
