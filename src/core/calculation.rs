//! Read-side queries over a ledger book. Nothing here mutates the book.
//!
//! Every query accepts an optional book; an absent book yields `None` ("no data available").

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::ledger::{BucketCode, BudgetPlanProvider, LedgerBook, Reconciliation};

/// Date window a query is asked about. Open ends are unbounded.
///
/// Only `end` selects the applicable reconciliation; a window starting after the latest
/// reconciliation still reports the state that reconciliation left behind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerFilter {
    pub begin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl LedgerFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn as_of(end: NaiveDate) -> Self {
        Self {
            begin: None,
            end: Some(end),
        }
    }

    pub fn between(begin: NaiveDate, end: NaiveDate) -> Self {
        Self {
            begin: Some(begin),
            end: Some(end),
        }
    }

    fn reaches(&self, date: NaiveDate) -> bool {
        self.end.map_or(true, |end| date <= end)
    }
}

pub struct LedgerCalculation;

impl LedgerCalculation {
    /// Most recent reconciliation dated at or before the filter's end.
    pub fn applicable_reconciliation<'a>(
        book: Option<&'a LedgerBook>,
        filter: &LedgerFilter,
    ) -> Option<&'a Reconciliation> {
        book?
            .reconciliations()
            .iter()
            .rev()
            .find(|reconciliation| filter.reaches(reconciliation.date()))
    }

    /// Balance of `bucket` in the applicable reconciliation.
    ///
    /// Before any reconciliation exists the budgeted amount from `plan` is used, or zero.
    /// Once the book has history, a filter ending before it or a bucket absent from the
    /// applicable reconciliation yields zero.
    pub fn applicable_balance(
        book: Option<&LedgerBook>,
        filter: &LedgerFilter,
        bucket: &BucketCode,
        plan: Option<&dyn BudgetPlanProvider>,
    ) -> Option<Decimal> {
        let book = book?;
        if book.reconciliations().is_empty() {
            return Some(
                plan.and_then(|plan| plan.budget_for(bucket))
                    .map(|budget| budget.amount)
                    .unwrap_or(Decimal::ZERO),
            );
        }
        Some(
            Self::applicable_reconciliation(Some(book), filter)
                .and_then(|reconciliation| reconciliation.entry(bucket))
                .map(|entry| entry.balance())
                .unwrap_or(Decimal::ZERO),
        )
    }

    /// Calculated surplus of the applicable reconciliation; zero when none applies.
    pub fn surplus(book: Option<&LedgerBook>, filter: &LedgerFilter) -> Option<Decimal> {
        let book = book?;
        Some(
            Self::applicable_reconciliation(Some(book), filter)
                .map(Reconciliation::calculated_surplus)
                .unwrap_or(Decimal::ZERO),
        )
    }

    /// Buckets whose spending exceeded their funds in the applicable reconciliation.
    pub fn overspent_buckets(
        book: Option<&LedgerBook>,
        filter: &LedgerFilter,
    ) -> Option<Vec<BucketCode>> {
        let book = book?;
        Some(
            Self::applicable_reconciliation(Some(book), filter)
                .map(|reconciliation| {
                    reconciliation
                        .entries()
                        .iter()
                        .filter(|entry| entry.absorbed_shortfall())
                        .map(|entry| entry.bucket().clone())
                        .collect()
                })
                .unwrap_or_default(),
        )
    }

    /// Closing balance of one bucket in every reconciliation that carries it, oldest first.
    pub fn bucket_history(
        book: Option<&LedgerBook>,
        bucket: &BucketCode,
    ) -> Option<Vec<(NaiveDate, Decimal)>> {
        Some(
            book?
                .reconciliations()
                .iter()
                .filter_map(|reconciliation| {
                    reconciliation
                        .entry(bucket)
                        .map(|entry| (reconciliation.date(), entry.balance()))
                })
                .collect(),
        )
    }

    /// Bucket balances of the latest reconciliation.
    pub fn current_balances(book: Option<&LedgerBook>) -> Option<BTreeMap<BucketCode, Decimal>> {
        let book = book?;
        Some(
            book.latest()
                .map(|latest| {
                    latest
                        .entries()
                        .iter()
                        .map(|entry| (entry.bucket().clone(), entry.balance()))
                        .collect()
                })
                .unwrap_or_default(),
        )
    }

    /// Adjusted balance of one bank account in the applicable reconciliation.
    pub fn account_balance(
        book: Option<&LedgerBook>,
        filter: &LedgerFilter,
        account_code: &str,
    ) -> Option<Decimal> {
        Self::applicable_reconciliation(book, filter)?
            .adjusted_balance(&account_code.trim().to_uppercase())
    }
}
