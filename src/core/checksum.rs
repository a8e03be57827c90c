use rust_decimal::Decimal;

use crate::{currency, ledger::LedgerBook};

/// Deterministic, non-cryptographic summary of every amount and balance in the book.
///
/// Per reconciliation: raw bank balances, bank-balance adjustments, and for each entry
/// its closing balance plus all of its transaction amounts. Opening balances are not included
/// since they repeat the previous closing balance.
pub fn calculate_checksum(book: &LedgerBook) -> Decimal {
    currency::sum(book.reconciliations().iter().map(|reconciliation| {
        let entries = currency::sum(
            reconciliation
                .entries()
                .iter()
                .map(|entry| entry.balance() + entry.net_change()),
        );
        reconciliation.statement_balance() + reconciliation.total_adjustments() + entries
    }))
}
