use std::result::Result as StdResult;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error type that captures reconciliation, integrity, and persistence failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Reconciliation date {date} must be after the latest reconciliation on {latest}")]
    OrderingViolation { date: NaiveDate, latest: NaiveDate },
    #[error("Unknown ledger bucket: {0}")]
    UnknownBucket(String),
    #[error("Unknown bank account: {0}")]
    UnknownAccount(String),
    #[error("No bank balance supplied for tracked account: {0}")]
    MissingBankBalance(String),
    #[error("Bank balance supplied more than once for account: {0}")]
    DuplicateBankBalance(String),
    #[error("Checksum mismatch: document states {stored}, recalculated {computed}")]
    ChecksumMismatch { stored: Decimal, computed: Decimal },
    #[error("Corrupt ledger document: {0}")]
    CorruptDocument(String),
    #[error("Invalid bucket definition: {0}")]
    InvalidBucket(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, LedgerError>;
