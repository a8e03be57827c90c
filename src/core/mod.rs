//! Reconciliation engine services: the builder, read-side calculations, and the book checksum.

pub mod calculation;
pub mod checksum;
pub mod reconciliation;
pub mod utils;

pub use calculation::{LedgerCalculation, LedgerFilter};
pub use checksum::calculate_checksum;
pub use reconciliation::{
    BankAdjustment, BucketTransfer, ManualTransaction, ReconciliationAlgorithm,
    ReconciliationRequest, StandardReconciliation,
};
