//! Ledger domain models: envelopes, transactions, reconciliations, and the book that owns them.

pub mod account;
pub mod bucket;
pub mod budget;
pub mod entry;
pub mod ledger_book;
pub mod reconciliation;
pub mod statement;
pub mod transaction;

pub use account::{AccountKind, BankAccount};
pub use bucket::{AccumulationPolicy, BucketCode, LedgerBucket, SURPLUS_CODE};
pub use budget::{BudgetCycle, BudgetPlan, BudgetPlanProvider, BudgetedAmount};
pub use entry::{LedgerEntry, RESET_NARRATIVE, SHORTFALL_NARRATIVE};
pub use ledger_book::LedgerBook;
pub use reconciliation::{BankBalance, Reconciliation, ReconciliationState};
pub use statement::StatementTransaction;
pub use transaction::{LedgerTransaction, TransactionKind};
