//! Budget plan inputs: how much each envelope receives and how often.

use std::{collections::BTreeMap, fmt};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::bucket::BucketCode;

const FORTNIGHT_DAYS: i64 = 14;

/// Enumerates the supported budgeting cadences.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum BudgetCycle {
    #[default]
    Monthly,
    Fortnightly,
}

impl BudgetCycle {
    /// Number of whole budget periods between two reconciliation dates.
    ///
    /// A monthly period ending in a shorter month completes on that month's last day.
    pub fn periods_between(self, previous: NaiveDate, current: NaiveDate) -> u32 {
        if current <= previous {
            return 0;
        }
        match self {
            BudgetCycle::Monthly => {
                let mut months = (current.year() - previous.year()) * 12
                    + current.month() as i32
                    - previous.month() as i32;
                if current.day() < previous.day().min(days_in_month(current)) {
                    months -= 1;
                }
                months.max(0) as u32
            }
            BudgetCycle::Fortnightly => {
                ((current - previous).num_days() / FORTNIGHT_DAYS).max(0) as u32
            }
        }
    }

    /// Periods completed by `current` that were not already completed by `previous`,
    /// both counted from `anchor` so partial periods carry into the next gap.
    pub fn periods_elapsed(
        self,
        anchor: NaiveDate,
        previous: NaiveDate,
        current: NaiveDate,
    ) -> u32 {
        self.periods_between(anchor, current)
            .saturating_sub(self.periods_between(anchor, previous))
    }
}

fn days_in_month(date: NaiveDate) -> u32 {
    (28..=31)
        .rev()
        .find(|&day| date.with_day(day).is_some())
        .unwrap_or(28)
}

impl fmt::Display for BudgetCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetCycle::Monthly => "Monthly",
            BudgetCycle::Fortnightly => "Fortnightly",
        };
        f.write_str(label)
    }
}

/// Per-period contribution for one envelope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetedAmount {
    pub amount: Decimal,
    pub cycle: BudgetCycle,
}

/// Supplies budgeted contributions. Implemented by the budget model collaborator.
pub trait BudgetPlanProvider {
    /// Returns the contribution for `bucket`, or `None` when it is not budgeted.
    fn budget_for(&self, bucket: &BucketCode) -> Option<BudgetedAmount>;

    /// Every bucket code the plan budgets for.
    fn budgeted_buckets(&self) -> Vec<BucketCode>;
}

/// In-memory budget plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BudgetPlan {
    pub cycle: BudgetCycle,
    amounts: BTreeMap<BucketCode, BudgetedAmount>,
}

impl BudgetPlan {
    pub fn new(cycle: BudgetCycle) -> Self {
        Self {
            cycle,
            amounts: BTreeMap::new(),
        }
    }

    pub fn monthly() -> Self {
        Self::new(BudgetCycle::Monthly)
    }

    pub fn fortnightly() -> Self {
        Self::new(BudgetCycle::Fortnightly)
    }

    /// Budgets `amount` per period of the plan's cycle for `bucket`.
    pub fn with(mut self, bucket: impl Into<BucketCode>, amount: Decimal) -> Self {
        let cycle = self.cycle;
        self.set(bucket, amount, cycle);
        self
    }

    pub fn with_cycle(
        mut self,
        bucket: impl Into<BucketCode>,
        amount: Decimal,
        cycle: BudgetCycle,
    ) -> Self {
        self.set(bucket, amount, cycle);
        self
    }

    pub fn set(&mut self, bucket: impl Into<BucketCode>, amount: Decimal, cycle: BudgetCycle) {
        self.amounts
            .insert(bucket.into(), BudgetedAmount { amount, cycle });
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

impl BudgetPlanProvider for BudgetPlan {
    fn budget_for(&self, bucket: &BucketCode) -> Option<BudgetedAmount> {
        self.amounts.get(bucket).copied()
    }

    fn budgeted_buckets(&self) -> Vec<BucketCode> {
        self.amounts.keys().cloned().collect()
    }
}
