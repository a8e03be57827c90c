use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::bucket::BucketCode;

/// A bank statement transaction already assigned to an envelope by the categorization rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatementTransaction {
    /// `None` means uncategorized; such transactions are ignored by reconciliation.
    pub bucket: Option<BucketCode>,
    pub account: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl StatementTransaction {
    pub fn new(
        bucket: impl Into<BucketCode>,
        account: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            bucket: Some(bucket.into()),
            account: account.into().trim().to_uppercase(),
            amount,
            date,
            description: description.into(),
            reference: None,
        }
    }

    pub fn uncategorized(
        account: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            bucket: None,
            account: account.into().trim().to_uppercase(),
            amount,
            date,
            description: description.into(),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        let reference = reference.into().trim().to_string();
        self.reference = (!reference.is_empty()).then_some(reference);
        self
    }
}
