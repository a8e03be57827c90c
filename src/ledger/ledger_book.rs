use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    core::reconciliation::{
        ReconciliationAlgorithm, ReconciliationRequest, StandardReconciliation,
    },
    errors::LedgerError,
};

use super::{
    account::BankAccount,
    budget::BudgetPlanProvider,
    bucket::{AccumulationPolicy, BucketCode, LedgerBucket},
    reconciliation::Reconciliation,
    statement::StatementTransaction,
};

/// Root aggregate: ordered reconciliation history plus the bucket definitions being tracked.
#[derive(Debug, Clone)]
pub struct LedgerBook {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    buckets: Vec<LedgerBucket>,
    reconciliations: Vec<Reconciliation>,
}

impl LedgerBook {
    /// Starts a new, empty book. The surplus bucket is stored in `surplus_account`.
    pub fn new(name: impl Into<String>, surplus_account: BankAccount) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            modified_at: now,
            buckets: vec![LedgerBucket::surplus(surplus_account)],
            reconciliations: Vec::new(),
        }
    }

    /// Rebuilds a persisted book, checking ordering and reference integrity.
    pub fn restore(
        id: Uuid,
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
        buckets: Vec<LedgerBucket>,
        reconciliations: Vec<Reconciliation>,
    ) -> Result<Self, LedgerError> {
        let mut codes = HashSet::new();
        for bucket in &buckets {
            if !codes.insert(bucket.code.clone()) {
                return Err(LedgerError::CorruptDocument(format!(
                    "bucket {} is defined more than once",
                    bucket.code
                )));
            }
            validate_surplus_shape(bucket).map_err(LedgerError::CorruptDocument)?;
        }
        if !codes.contains(&BucketCode::surplus()) {
            return Err(LedgerError::CorruptDocument(
                "ledger book has no surplus bucket".into(),
            ));
        }
        for pair in reconciliations.windows(2) {
            if pair[1].date() <= pair[0].date() {
                return Err(LedgerError::CorruptDocument(format!(
                    "reconciliation {} is not after {}",
                    pair[1].date(),
                    pair[0].date()
                )));
            }
        }
        for reconciliation in &reconciliations {
            for entry in reconciliation.entries() {
                if !codes.contains(entry.bucket()) {
                    return Err(LedgerError::UnknownBucket(entry.bucket().to_string()));
                }
            }
        }
        Ok(Self {
            id,
            name: name.into(),
            created_at,
            modified_at,
            buckets,
            reconciliations,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Reconciliation history in ascending date order.
    pub fn reconciliations(&self) -> &[Reconciliation] {
        &self.reconciliations
    }

    pub fn latest(&self) -> Option<&Reconciliation> {
        self.reconciliations.last()
    }

    pub fn buckets(&self) -> &[LedgerBucket] {
        &self.buckets
    }

    pub fn active_buckets(&self) -> impl Iterator<Item = &LedgerBucket> {
        self.buckets.iter().filter(|bucket| bucket.active)
    }

    pub fn bucket(&self, code: &BucketCode) -> Option<&LedgerBucket> {
        self.buckets.iter().find(|bucket| &bucket.code == code)
    }

    pub fn surplus_bucket(&self) -> Option<&LedgerBucket> {
        self.buckets.iter().find(|bucket| bucket.is_surplus())
    }

    /// Inserts a bucket definition, or replaces the existing definition with the same code.
    pub fn register_bucket(&mut self, bucket: LedgerBucket) -> Result<(), LedgerError> {
        validate_surplus_shape(&bucket).map_err(LedgerError::InvalidBucket)?;
        if bucket.code.is_surplus() && !bucket.active {
            return Err(LedgerError::InvalidBucket(
                "the surplus bucket cannot be deactivated".into(),
            ));
        }
        match self.buckets.iter_mut().find(|existing| existing.code == bucket.code) {
            Some(existing) => {
                debug!(bucket = %bucket.code, "replacing ledger bucket definition");
                *existing = bucket;
            }
            None => {
                debug!(bucket = %bucket.code, "registering ledger bucket");
                self.buckets.push(bucket);
            }
        }
        self.touch();
        Ok(())
    }

    /// Builds and appends a reconciliation with the production algorithm.
    pub fn reconcile(
        &mut self,
        request: &ReconciliationRequest,
        plan: &dyn BudgetPlanProvider,
        statement: &[StatementTransaction],
    ) -> Result<&Reconciliation, LedgerError> {
        self.reconcile_with(&StandardReconciliation, request, plan, statement)
    }

    /// Builds and appends a reconciliation using `algorithm`. The book is untouched on failure.
    pub fn reconcile_with(
        &mut self,
        algorithm: &dyn ReconciliationAlgorithm,
        request: &ReconciliationRequest,
        plan: &dyn BudgetPlanProvider,
        statement: &[StatementTransaction],
    ) -> Result<&Reconciliation, LedgerError> {
        let reconciliation = algorithm.build(self, request, plan, statement)?;
        self.append(reconciliation)?;
        info!(
            book = %self.name,
            date = %request.date,
            reconciliations = self.reconciliations.len(),
            "reconciliation appended"
        );
        self.latest()
            .ok_or_else(|| LedgerError::InvalidInput("reconciliation was not appended".into()))
    }

    fn append(&mut self, reconciliation: Reconciliation) -> Result<(), LedgerError> {
        if let Some(latest) = self.latest() {
            if reconciliation.date() <= latest.date() {
                return Err(LedgerError::OrderingViolation {
                    date: reconciliation.date(),
                    latest: latest.date(),
                });
            }
        }
        for entry in reconciliation.entries() {
            if self.bucket(entry.bucket()).is_none() {
                return Err(LedgerError::UnknownBucket(entry.bucket().to_string()));
            }
        }
        self.reconciliations.push(reconciliation);
        self.touch();
        Ok(())
    }

    /// Marks every draft reconciliation as committed after a successful save.
    pub fn mark_committed(&mut self) {
        for reconciliation in self.reconciliations.iter_mut().filter(|r| r.is_draft()) {
            reconciliation.commit();
        }
    }

    pub fn has_drafts(&self) -> bool {
        self.reconciliations.iter().any(|r| r.is_draft())
    }

    /// Auto-matching references already applied anywhere in the history.
    pub fn consumed_references(&self) -> HashSet<String> {
        self.reconciliations
            .iter()
            .flat_map(|r| r.entries())
            .flat_map(|entry| entry.transactions())
            .filter_map(|txn| txn.auto_matching_reference())
            .map(str::to_string)
            .collect()
    }

    /// Accounts that must receive a bank balance in the next reconciliation.
    pub fn tracked_accounts(&self) -> BTreeMap<String, BankAccount> {
        let mut accounts = BTreeMap::new();
        if let Some(latest) = self.latest() {
            for balance in latest.bank_balances() {
                accounts.insert(balance.account.code.clone(), balance.account.clone());
            }
        }
        for bucket in self.active_buckets() {
            accounts
                .entry(bucket.stored_in.code.clone())
                .or_insert_with(|| bucket.stored_in.clone());
        }
        accounts
    }

    /// Non-fatal anomalies worth surfacing to the user.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let Some(latest) = self.latest() else {
            return warnings;
        };
        for bucket in &self.buckets {
            if !latest.tracks_account(&bucket.stored_in.code) {
                warnings.push(format!(
                    "bucket {} is stored in {} which has no balance in the latest reconciliation",
                    bucket.code, bucket.stored_in.code
                ));
            }
            if !bucket.active {
                if let Some(entry) = latest.entry(&bucket.code) {
                    if !entry.balance().is_zero() {
                        warnings.push(format!(
                            "inactive bucket {} still holds {}",
                            bucket.code,
                            entry.balance()
                        ));
                    }
                }
            }
        }
        let surplus = latest.calculated_surplus();
        if surplus.is_sign_negative() && !surplus.is_zero() {
            warnings.push(format!(
                "envelopes exceed bank funds by {} as of {}",
                surplus.abs(),
                latest.date()
            ));
        }
        warnings
    }

    fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

fn validate_surplus_shape(bucket: &LedgerBucket) -> Result<(), String> {
    match (bucket.code.is_surplus(), bucket.policy) {
        (true, AccumulationPolicy::Surplus) | (false, AccumulationPolicy::Accumulate)
        | (false, AccumulationPolicy::ResetEachPeriod) => Ok(()),
        (true, _) => Err("the surplus bucket must keep the surplus policy".into()),
        (false, AccumulationPolicy::Surplus) => Err(format!(
            "bucket {} cannot use the surplus policy; only one surplus bucket exists",
            bucket.code
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::AccountKind;

    fn cheque() -> BankAccount {
        BankAccount::new("CHEQUE", "Cheque", AccountKind::Cheque)
    }

    #[test]
    fn new_book_has_surplus_bucket() {
        let book = LedgerBook::new("Household", cheque());
        assert_eq!(book.buckets().len(), 1);
        assert!(book.surplus_bucket().is_some());
        assert!(book.reconciliations().is_empty());
    }

    #[test]
    fn register_bucket_replaces_by_code() {
        let mut book = LedgerBook::new("Household", cheque());
        let savings = BankAccount::new("SAVINGS", "Savings", AccountKind::Savings);
        book.register_bucket(LedgerBucket::accumulating("car", cheque()))
            .unwrap();
        book.register_bucket(LedgerBucket::accumulating("CAR", savings.clone()))
            .unwrap();

        assert_eq!(book.buckets().len(), 2);
        let car = book.bucket(&BucketCode::new("car")).unwrap();
        assert_eq!(car.stored_in, savings);
    }

    #[test]
    fn surplus_rules_are_enforced() {
        let mut book = LedgerBook::new("Household", cheque());
        let err = book
            .register_bucket(LedgerBucket::surplus(cheque()).inactive())
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidBucket(_)));

        let err = book
            .register_bucket(LedgerBucket::new("SPARE", cheque(), AccumulationPolicy::Surplus))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidBucket(_)));
    }

    #[test]
    fn tracked_accounts_include_bucket_storage() {
        let mut book = LedgerBook::new("Household", cheque());
        let savings = BankAccount::new("SAVINGS", "Savings", AccountKind::Savings);
        book.register_bucket(LedgerBucket::accumulating("CAR", savings))
            .unwrap();
        let tracked = book.tracked_accounts();
        assert!(tracked.contains_key("CHEQUE"));
        assert!(tracked.contains_key("SAVINGS"));
    }
}
