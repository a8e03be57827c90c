//! Code-to-object resolution used to re-link persisted history to live definitions.

use std::collections::BTreeMap;

use crate::{
    errors::LedgerError,
    ledger::{BankAccount, BucketCode, LedgerBucket},
};

/// Resolves a persisted account code to its bank account. Unknown codes are an error.
pub trait AccountResolver {
    fn resolve_account(&self, code: &str) -> Result<BankAccount, LedgerError>;
}

/// Resolves a persisted bucket code to its definition. Unknown codes are an error.
pub trait BucketResolver {
    fn resolve_bucket(&self, code: &BucketCode) -> Result<LedgerBucket, LedgerError>;
}

#[derive(Debug, Clone, Default)]
pub struct AccountCatalog {
    accounts: BTreeMap<String, BankAccount>,
}

impl AccountCatalog {
    pub fn new(accounts: impl IntoIterator<Item = BankAccount>) -> Result<Self, LedgerError> {
        let mut catalog = BTreeMap::new();
        for account in accounts {
            if let Some(existing) = catalog.insert(account.code.clone(), account) {
                return Err(LedgerError::CorruptDocument(format!(
                    "account {} is defined more than once",
                    existing.code
                )));
            }
        }
        Ok(Self { accounts: catalog })
    }

    pub fn accounts(&self) -> impl Iterator<Item = &BankAccount> {
        self.accounts.values()
    }
}

impl AccountResolver for AccountCatalog {
    fn resolve_account(&self, code: &str) -> Result<BankAccount, LedgerError> {
        let key = code.trim().to_uppercase();
        self.accounts
            .get(&key)
            .cloned()
            .ok_or(LedgerError::UnknownAccount(key))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BucketCatalog {
    buckets: BTreeMap<BucketCode, LedgerBucket>,
}

impl BucketCatalog {
    pub fn new(buckets: impl IntoIterator<Item = LedgerBucket>) -> Result<Self, LedgerError> {
        let mut catalog = BTreeMap::new();
        for bucket in buckets {
            if let Some(existing) = catalog.insert(bucket.code.clone(), bucket) {
                return Err(LedgerError::CorruptDocument(format!(
                    "bucket {} is defined more than once",
                    existing.code
                )));
            }
        }
        Ok(Self { buckets: catalog })
    }
}

impl BucketResolver for BucketCatalog {
    fn resolve_bucket(&self, code: &BucketCode) -> Result<LedgerBucket, LedgerError> {
        self.buckets
            .get(code)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownBucket(code.to_string()))
    }
}
