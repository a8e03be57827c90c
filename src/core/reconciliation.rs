//! Builds new reconciliations from the book's prior state, a budget plan, and categorized statement lines.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    currency,
    errors::LedgerError,
    ledger::{
        AccumulationPolicy, BankAccount, BankBalance, BucketCode, BudgetPlanProvider, LedgerBook,
        LedgerBucket, LedgerEntry, LedgerTransaction, Reconciliation, StatementTransaction,
        RESET_NARRATIVE, SHORTFALL_NARRATIVE,
    },
};

/// Narrative of the periodic contribution transaction.
pub const BUDGET_CREDIT_NARRATIVE: &str = "Budgeted amount";

/// A correction against one bank account for transactions whose timing straddles the statement cut-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAdjustment {
    pub account: BankAccount,
    pub amount: Decimal,
    pub narrative: String,
}

/// A manual credit or debit against one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualTransaction {
    pub bucket: BucketCode,
    pub amount: Decimal,
    pub narrative: String,
    pub reference: Option<String>,
}

impl ManualTransaction {
    pub fn new(bucket: impl Into<BucketCode>, amount: Decimal, narrative: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            amount,
            narrative: narrative.into(),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Moves funds between two envelopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketTransfer {
    pub from: BucketCode,
    pub to: BucketCode,
    pub amount: Decimal,
    pub narrative: String,
}

impl BucketTransfer {
    pub fn new(
        from: impl Into<BucketCode>,
        to: impl Into<BucketCode>,
        amount: Decimal,
        narrative: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            narrative: narrative.into(),
        }
    }
}

/// User-supplied inputs for one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationRequest {
    pub date: NaiveDate,
    pub remarks: String,
    pub bank_balances: Vec<BankBalance>,
    pub adjustments: Vec<BankAdjustment>,
    pub manual_transactions: Vec<ManualTransaction>,
    pub transfers: Vec<BucketTransfer>,
}

impl ReconciliationRequest {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            remarks: String::new(),
            bank_balances: Vec::new(),
            adjustments: Vec::new(),
            manual_transactions: Vec::new(),
            transfers: Vec::new(),
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }

    pub fn with_balance(mut self, account: BankAccount, balance: Decimal) -> Self {
        self.bank_balances.push(BankBalance::new(account, balance));
        self
    }

    pub fn with_adjustment(
        mut self,
        account: BankAccount,
        amount: Decimal,
        narrative: impl Into<String>,
    ) -> Self {
        self.adjustments.push(BankAdjustment {
            account,
            amount,
            narrative: narrative.into(),
        });
        self
    }

    pub fn with_manual(mut self, transaction: ManualTransaction) -> Self {
        self.manual_transactions.push(transaction);
        self
    }

    pub fn with_transfer(mut self, transfer: BucketTransfer) -> Self {
        self.transfers.push(transfer);
        self
    }
}

/// Strategy that turns a request into a complete reconciliation without touching the book.
pub trait ReconciliationAlgorithm {
    fn build(
        &self,
        book: &LedgerBook,
        request: &ReconciliationRequest,
        plan: &dyn BudgetPlanProvider,
        statement: &[StatementTransaction],
    ) -> Result<Reconciliation, LedgerError>;
}

/// Production reconciliation algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardReconciliation;

/// Entry under construction for one active bucket.
struct PendingEntry<'a> {
    bucket: &'a LedgerBucket,
    opening: Decimal,
    /// Amount owed to the bucket this period, `None` when unbudgeted.
    budgeted: Option<Decimal>,
    transactions: Vec<LedgerTransaction>,
}

impl PendingEntry<'_> {
    fn running_balance(&self) -> Decimal {
        self.opening + currency::sum(self.transactions.iter().map(|t| t.amount()))
    }
}

impl ReconciliationAlgorithm for StandardReconciliation {
    fn build(
        &self,
        book: &LedgerBook,
        request: &ReconciliationRequest,
        plan: &dyn BudgetPlanProvider,
        statement: &[StatementTransaction],
    ) -> Result<Reconciliation, LedgerError> {
        let previous = book.latest();
        if let Some(latest) = previous {
            if request.date <= latest.date() {
                return Err(LedgerError::OrderingViolation {
                    date: request.date,
                    latest: latest.date(),
                });
            }
        }
        let accounts = check_bank_balances(book, request)?;
        for code in plan.budgeted_buckets() {
            if book.bucket(&code).is_none() {
                return Err(LedgerError::UnknownBucket(code.to_string()));
            }
        }

        let anchor = book.reconciliations().first().map(|first| first.date());
        let mut pending = Vec::new();
        let mut index = HashMap::new();
        for bucket in book.active_buckets() {
            let opening = previous
                .and_then(|p| p.entry(&bucket.code))
                .map(|entry| entry.balance())
                .unwrap_or(Decimal::ZERO);
            let budgeted = if bucket.receives_budget_credit() {
                plan.budget_for(&bucket.code).and_then(|budget| {
                    let periods = match (anchor, previous) {
                        (Some(anchor), Some(previous)) => {
                            budget
                                .cycle
                                .periods_elapsed(anchor, previous.date(), request.date)
                        }
                        _ => 1,
                    };
                    (periods > 0)
                        .then(|| currency::round_currency(budget.amount * Decimal::from(periods)))
                })
            } else {
                None
            };
            let mut transactions = Vec::new();
            if let Some(amount) = budgeted {
                transactions.push(LedgerTransaction::budget_credit(
                    amount,
                    request.date,
                    BUDGET_CREDIT_NARRATIVE,
                ));
            }
            index.insert(bucket.code.clone(), pending.len());
            pending.push(PendingEntry {
                bucket,
                opening,
                budgeted,
                transactions,
            });
        }

        let mut consumed = book.consumed_references();
        apply_statement(
            book,
            request,
            statement,
            &accounts,
            &mut consumed,
            &index,
            &mut pending,
        )?;
        apply_manual(book, request, &mut consumed, &index, &mut pending)?;
        apply_transfers(book, request, &index, &mut pending)?;

        let adjustments = request
            .adjustments
            .iter()
            .map(|adjustment| {
                LedgerTransaction::bank_balance_adjustment(
                    adjustment.account.clone(),
                    adjustment.amount,
                    request.date,
                    adjustment.narrative.clone(),
                )
            })
            .collect::<Vec<_>>();

        let mut entries = Vec::with_capacity(pending.len() + 1);
        let mut surplus_slot = None;
        let mut surplus_transactions = Vec::new();
        for draft in pending {
            if draft.bucket.is_surplus() {
                surplus_slot = Some(entries.len());
                surplus_transactions = draft.transactions;
                continue;
            }
            entries.push(close_entry(draft, request.date)?);
        }

        let total_bank = currency::sum(request.bank_balances.iter().map(|b| b.balance))
            + currency::sum(adjustments.iter().map(|t| t.amount()));
        let allocated = currency::sum(entries.iter().map(|e| e.balance()));
        let calculated = total_bank - allocated;
        if calculated < Decimal::ZERO {
            warn!(
                date = %request.date,
                surplus = %calculated,
                "envelope balances exceed bank funds; surplus held at zero"
            );
        }
        let surplus_opening = previous
            .and_then(|p| p.surplus_entry())
            .map(|entry| entry.balance())
            .unwrap_or(Decimal::ZERO);
        let surplus = LedgerEntry::surplus(
            surplus_opening,
            surplus_transactions,
            calculated.max(Decimal::ZERO),
        )?;
        match surplus_slot {
            Some(slot) => entries.insert(slot, surplus),
            None => entries.push(surplus),
        }

        debug!(
            date = %request.date,
            entries = entries.len(),
            total_bank = %total_bank,
            "reconciliation built"
        );
        Reconciliation::new(
            request.date,
            request.remarks.clone(),
            request.bank_balances.clone(),
            adjustments,
            entries,
        )
    }
}

/// Every tracked account must be supplied exactly once. Returns the supplied account codes.
fn check_bank_balances(
    book: &LedgerBook,
    request: &ReconciliationRequest,
) -> Result<HashSet<String>, LedgerError> {
    if request.bank_balances.is_empty() {
        return Err(LedgerError::InvalidInput(
            "a reconciliation needs at least one bank balance".into(),
        ));
    }
    let mut supplied = HashSet::new();
    for balance in &request.bank_balances {
        if !supplied.insert(balance.account.code.clone()) {
            return Err(LedgerError::DuplicateBankBalance(
                balance.account.code.clone(),
            ));
        }
    }
    for code in book.tracked_accounts().keys() {
        if !supplied.contains(code) {
            return Err(LedgerError::MissingBankBalance(code.clone()));
        }
    }
    for adjustment in &request.adjustments {
        if !supplied.contains(&adjustment.account.code) {
            return Err(LedgerError::UnknownAccount(adjustment.account.code.clone()));
        }
    }
    Ok(supplied)
}

fn apply_statement(
    book: &LedgerBook,
    request: &ReconciliationRequest,
    statement: &[StatementTransaction],
    accounts: &HashSet<String>,
    consumed: &mut HashSet<String>,
    index: &HashMap<BucketCode, usize>,
    pending: &mut [PendingEntry<'_>],
) -> Result<(), LedgerError> {
    let window_start = book.latest().map(|p| p.date());
    for line in statement {
        let Some(code) = &line.bucket else {
            debug!(description = %line.description, "ignoring uncategorized statement line");
            continue;
        };
        let before_window = window_start.map(|start| line.date < start).unwrap_or(false);
        if before_window || line.date >= request.date {
            debug!(date = %line.date, bucket = %code, "statement line outside reconciliation window");
            continue;
        }
        if book.bucket(code).is_none() {
            return Err(LedgerError::UnknownBucket(code.to_string()));
        }
        if !accounts.contains(&line.account) {
            return Err(LedgerError::UnknownAccount(line.account.clone()));
        }
        if let Some(reference) = &line.reference {
            if !consumed.insert(reference.clone()) {
                debug!(reference = %reference, bucket = %code, "skipping already matched statement line");
                continue;
            }
        }
        let Some(&slot) = index.get(code) else {
            warn!(bucket = %code, amount = %line.amount, "statement line targets an inactive bucket");
            continue;
        };
        pending[slot].transactions.push(LedgerTransaction::credit_debit(
            line.amount,
            line.date,
            line.description.clone(),
            line.reference.clone(),
        ));
    }
    Ok(())
}

fn active_slot(
    book: &LedgerBook,
    index: &HashMap<BucketCode, usize>,
    code: &BucketCode,
) -> Result<usize, LedgerError> {
    if book.bucket(code).is_none() {
        return Err(LedgerError::UnknownBucket(code.to_string()));
    }
    index
        .get(code)
        .copied()
        .ok_or_else(|| LedgerError::InvalidInput(format!("bucket {code} is inactive")))
}

fn apply_manual(
    book: &LedgerBook,
    request: &ReconciliationRequest,
    consumed: &mut HashSet<String>,
    index: &HashMap<BucketCode, usize>,
    pending: &mut [PendingEntry<'_>],
) -> Result<(), LedgerError> {
    for manual in &request.manual_transactions {
        let slot = active_slot(book, index, &manual.bucket)?;
        let transaction = LedgerTransaction::credit_debit(
            manual.amount,
            request.date,
            manual.narrative.clone(),
            manual.reference.clone(),
        );
        if let Some(reference) = transaction.auto_matching_reference() {
            if !consumed.insert(reference.to_string()) {
                debug!(reference = %reference, bucket = %manual.bucket, "skipping already matched manual transaction");
                continue;
            }
        }
        pending[slot].transactions.push(transaction);
    }
    Ok(())
}

fn apply_transfers(
    book: &LedgerBook,
    request: &ReconciliationRequest,
    index: &HashMap<BucketCode, usize>,
    pending: &mut [PendingEntry<'_>],
) -> Result<(), LedgerError> {
    for transfer in &request.transfers {
        if transfer.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!(
                "transfer amount must be positive, got {}",
                transfer.amount
            )));
        }
        if transfer.from == transfer.to {
            return Err(LedgerError::InvalidInput(format!(
                "cannot transfer from {} to itself",
                transfer.from
            )));
        }
        let from = active_slot(book, index, &transfer.from)?;
        let to = active_slot(book, index, &transfer.to)?;
        for slot in [from, to] {
            let bucket = pending[slot].bucket;
            if bucket.policy == AccumulationPolicy::ResetEachPeriod {
                return Err(LedgerError::InvalidInput(format!(
                    "bucket {} resets each period and cannot take part in a transfer",
                    bucket.code
                )));
            }
        }
        let reference = format!("XFER-{}", Uuid::new_v4().simple());
        pending[from].transactions.push(LedgerTransaction::credit_debit(
            -transfer.amount,
            request.date,
            transfer.narrative.clone(),
            Some(reference.clone()),
        ));
        pending[to].transactions.push(LedgerTransaction::credit_debit(
            transfer.amount,
            request.date,
            transfer.narrative.clone(),
            Some(reference),
        ));
    }
    Ok(())
}

/// Applies the accumulation policy and the zero floor, then seals the entry.
///
/// A budgeted reset bucket closes at its budgeted amount whatever the statement and manual
/// lines did to it; transfers touching such a bucket are rejected earlier.
fn close_entry(mut draft: PendingEntry<'_>, date: NaiveDate) -> Result<LedgerEntry, LedgerError> {
    let mut balance = draft.running_balance();
    if draft.bucket.policy == AccumulationPolicy::ResetEachPeriod {
        if let Some(target) = draft.budgeted {
            if balance != target {
                draft.transactions.push(LedgerTransaction::credit_debit(
                    target - balance,
                    date,
                    RESET_NARRATIVE,
                    None,
                ));
                balance = target;
            }
        }
    }
    if balance < Decimal::ZERO {
        warn!(
            bucket = %draft.bucket.code,
            shortfall = %balance.abs(),
            "envelope overspent; shortfall absorbed"
        );
        draft.transactions.push(LedgerTransaction::credit_debit(
            -balance,
            date,
            SHORTFALL_NARRATIVE,
            None,
        ));
    }
    LedgerEntry::new(draft.bucket.code.clone(), draft.opening, draft.transactions)
}
