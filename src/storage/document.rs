//! Persisted document shape for a ledger book and the mapping to and from the live object graph.
//!
//! Documents reference buckets and accounts by code only. Loading re-links every code through
//! the resolvers and recomputes the checksum before handing the book back.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    core::checksum::calculate_checksum,
    errors::LedgerError,
    ledger::{
        AccumulationPolicy, BankAccount, BankBalance, BucketCode, LedgerBook, LedgerBucket,
        LedgerEntry, LedgerTransaction, Reconciliation, TransactionKind,
    },
};

use super::resolvers::{AccountCatalog, AccountResolver, BucketCatalog, BucketResolver};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerBookDocument {
    pub schema_version: u32,
    pub id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub checksum: Decimal,
    pub accounts: Vec<BankAccount>,
    pub buckets: Vec<BucketDocument>,
    pub reconciliations: Vec<ReconciliationDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BucketDocument {
    pub code: String,
    pub stored_in: String,
    pub policy: AccumulationPolicy,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BankBalanceDocument {
    pub account: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconciliationDocument {
    pub date: NaiveDate,
    #[serde(default)]
    pub remarks: String,
    pub bank_balances: Vec<BankBalanceDocument>,
    #[serde(default)]
    pub adjustments: Vec<TransactionDocument>,
    pub entries: Vec<EntryDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryDocument {
    pub bucket: String,
    pub opening_balance: Decimal,
    pub balance: Decimal,
    pub transactions: Vec<TransactionDocument>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKindDocument {
    BudgetCredit,
    CreditDebit,
    BankBalanceAdjustment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionDocument {
    pub id: Uuid,
    pub kind: TransactionKindDocument,
    pub amount: Decimal,
    pub narrative: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_matching_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

/// Maps a ledger book to its persisted document and back.
pub struct DocumentMapper;

impl DocumentMapper {
    /// Flattens the book to codes and stamps the current checksum.
    pub fn to_document(book: &LedgerBook) -> LedgerBookDocument {
        let mut accounts = BTreeMap::new();
        for bucket in book.buckets() {
            accounts
                .entry(bucket.stored_in.code.clone())
                .or_insert_with(|| bucket.stored_in.clone());
        }
        for reconciliation in book.reconciliations() {
            for balance in reconciliation.bank_balances() {
                accounts
                    .entry(balance.account.code.clone())
                    .or_insert_with(|| balance.account.clone());
            }
        }

        LedgerBookDocument {
            schema_version: SCHEMA_VERSION,
            id: book.id(),
            name: book.name().to_string(),
            created: book.created_at(),
            modified: book.modified_at(),
            checksum: calculate_checksum(book),
            accounts: accounts.into_values().collect(),
            buckets: book
                .buckets()
                .iter()
                .map(|bucket| BucketDocument {
                    code: bucket.code.to_string(),
                    stored_in: bucket.stored_in.code.clone(),
                    policy: bucket.policy,
                    active: bucket.active,
                })
                .collect(),
            reconciliations: book
                .reconciliations()
                .iter()
                .map(reconciliation_to_document)
                .collect(),
        }
    }

    /// Rebuilds a book from a document using the account and bucket definitions it carries.
    pub fn from_document(document: LedgerBookDocument) -> Result<LedgerBook, LedgerError> {
        check_schema(&document)?;
        let accounts = AccountCatalog::new(document.accounts.iter().cloned())?;
        let buckets = document
            .buckets
            .iter()
            .map(|bucket| {
                Ok(LedgerBucket {
                    code: BucketCode::new(&bucket.code),
                    stored_in: accounts.resolve_account(&bucket.stored_in)?,
                    policy: bucket.policy,
                    active: bucket.active,
                })
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;
        let buckets = BucketCatalog::new(buckets)?;
        Self::from_document_with(document, &accounts, &buckets)
    }

    /// Rebuilds a book, resolving every code through the supplied resolvers.
    pub fn from_document_with(
        document: LedgerBookDocument,
        accounts: &dyn AccountResolver,
        buckets: &dyn BucketResolver,
    ) -> Result<LedgerBook, LedgerError> {
        check_schema(&document)?;
        let definitions = document
            .buckets
            .iter()
            .map(|bucket| buckets.resolve_bucket(&BucketCode::new(&bucket.code)))
            .collect::<Result<Vec<_>, LedgerError>>()?;
        let reconciliations = document
            .reconciliations
            .iter()
            .map(|reconciliation| reconciliation_from_document(reconciliation, accounts, buckets))
            .collect::<Result<Vec<_>, LedgerError>>()?;

        let book = LedgerBook::restore(
            document.id,
            document.name,
            document.created,
            document.modified,
            definitions,
            reconciliations,
        )?;

        let computed = calculate_checksum(&book);
        if computed != document.checksum {
            warn!(
                book = %book.name(),
                stored = %document.checksum,
                computed = %computed,
                "ledger checksum mismatch"
            );
            return Err(LedgerError::ChecksumMismatch {
                stored: document.checksum,
                computed,
            });
        }
        debug!(
            book = %book.name(),
            reconciliations = book.reconciliations().len(),
            "ledger document re-linked"
        );
        Ok(book)
    }
}

fn check_schema(document: &LedgerBookDocument) -> Result<(), LedgerError> {
    if document.schema_version > SCHEMA_VERSION {
        return Err(LedgerError::Persistence(format!(
            "document schema version {} is newer than supported version {}",
            document.schema_version, SCHEMA_VERSION
        )));
    }
    Ok(())
}

fn reconciliation_to_document(reconciliation: &Reconciliation) -> ReconciliationDocument {
    ReconciliationDocument {
        date: reconciliation.date(),
        remarks: reconciliation.remarks().to_string(),
        bank_balances: reconciliation
            .bank_balances()
            .iter()
            .map(|balance| BankBalanceDocument {
                account: balance.account.code.clone(),
                balance: balance.balance,
            })
            .collect(),
        adjustments: reconciliation
            .adjustments()
            .iter()
            .map(transaction_to_document)
            .collect(),
        entries: reconciliation
            .entries()
            .iter()
            .map(|entry| EntryDocument {
                bucket: entry.bucket().to_string(),
                opening_balance: entry.opening_balance(),
                balance: entry.balance(),
                transactions: entry
                    .transactions()
                    .iter()
                    .map(transaction_to_document)
                    .collect(),
            })
            .collect(),
    }
}

fn transaction_to_document(transaction: &LedgerTransaction) -> TransactionDocument {
    let (kind, auto_matching_reference, account) = match transaction.kind() {
        TransactionKind::BudgetCredit => (TransactionKindDocument::BudgetCredit, None, None),
        TransactionKind::CreditDebit {
            auto_matching_reference,
        } => (
            TransactionKindDocument::CreditDebit,
            auto_matching_reference.clone(),
            None,
        ),
        TransactionKind::BankBalanceAdjustment { account } => (
            TransactionKindDocument::BankBalanceAdjustment,
            None,
            Some(account.code.clone()),
        ),
    };
    TransactionDocument {
        id: transaction.id(),
        kind,
        amount: transaction.amount(),
        narrative: transaction.narrative().to_string(),
        date: transaction.date(),
        auto_matching_reference,
        account,
    }
}

fn transaction_from_document(
    document: &TransactionDocument,
    accounts: &dyn AccountResolver,
) -> Result<LedgerTransaction, LedgerError> {
    let kind = match document.kind {
        TransactionKindDocument::BudgetCredit => TransactionKind::BudgetCredit,
        TransactionKindDocument::CreditDebit => TransactionKind::CreditDebit {
            auto_matching_reference: document.auto_matching_reference.clone(),
        },
        TransactionKindDocument::BankBalanceAdjustment => {
            let code = document.account.as_deref().ok_or_else(|| {
                LedgerError::CorruptDocument(format!(
                    "bank balance adjustment {} has no account",
                    document.id
                ))
            })?;
            TransactionKind::BankBalanceAdjustment {
                account: accounts.resolve_account(code)?,
            }
        }
    };
    Ok(LedgerTransaction::restore(
        document.id,
        document.amount,
        document.narrative.clone(),
        document.date,
        kind,
    ))
}

fn reconciliation_from_document(
    document: &ReconciliationDocument,
    accounts: &dyn AccountResolver,
    buckets: &dyn BucketResolver,
) -> Result<Reconciliation, LedgerError> {
    let bank_balances = document
        .bank_balances
        .iter()
        .map(|balance| {
            Ok(BankBalance::new(
                accounts.resolve_account(&balance.account)?,
                balance.balance,
            ))
        })
        .collect::<Result<Vec<_>, LedgerError>>()?;
    let adjustments = document
        .adjustments
        .iter()
        .map(|adjustment| transaction_from_document(adjustment, accounts))
        .collect::<Result<Vec<_>, LedgerError>>()?;
    let entries = document
        .entries
        .iter()
        .map(|entry| {
            let bucket = buckets.resolve_bucket(&BucketCode::new(&entry.bucket))?;
            let transactions = entry
                .transactions
                .iter()
                .map(|transaction| transaction_from_document(transaction, accounts))
                .collect::<Result<Vec<_>, LedgerError>>()?;
            LedgerEntry::restore(
                bucket.code,
                entry.opening_balance,
                transactions,
                entry.balance,
            )
        })
        .collect::<Result<Vec<_>, LedgerError>>()?;
    Reconciliation::restore(
        document.date,
        document.remarks.clone(),
        bank_balances,
        adjustments,
        entries,
    )
}
