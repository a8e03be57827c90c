mod common;

use budget_ledger::{
    core::calculate_checksum,
    ledger::{BucketCode, LedgerBook, RESET_NARRATIVE},
};
use common::{date, five_period_book, three_period_book};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn balance(book: &LedgerBook, index: usize, bucket: &str) -> Decimal {
    book.reconciliations()[index]
        .entry(&BucketCode::new(bucket))
        .expect("bucket entry")
        .balance()
}

#[test]
fn three_period_book_reaches_expected_august_balances() {
    let book = three_period_book();
    assert_eq!(book.reconciliations().len(), 3);

    let june = &book.reconciliations()[0];
    assert_eq!(june.date(), date(2013, 6, 15));
    assert_eq!(june.total_bank_balance(), dec!(2500));
    assert_eq!(balance(&book, 0, "HAIRCUT"), dec!(10));
    assert_eq!(balance(&book, 0, "POWER"), dec!(16.44));
    assert_eq!(balance(&book, 0, "PHONE"), dec!(95));
    assert_eq!(june.calculated_surplus(), dec!(2378.56));

    assert_eq!(balance(&book, 1, "HAIRCUT"), dec!(65));
    assert_eq!(balance(&book, 1, "POWER"), dec!(10.94));

    let august = book.latest().expect("latest reconciliation");
    assert_eq!(balance(&book, 2, "HAIRCUT"), dec!(60));
    assert_eq!(balance(&book, 2, "POWER"), dec!(0));
    assert_eq!(balance(&book, 2, "PHONE"), dec!(95));
    assert_eq!(august.calculated_surplus(), dec!(3145));
    assert_eq!(
        august.surplus_entry().expect("surplus entry").balance(),
        dec!(3145)
    );
    assert_eq!(calculate_checksum(&book), dec!(19155.00));
}

#[test]
fn overspent_power_bucket_absorbs_its_shortfall() {
    let book = three_period_book();
    let power = book.reconciliations()[2]
        .entry(&BucketCode::new("POWER"))
        .expect("power entry");
    assert!(power.absorbed_shortfall());
    assert_eq!(power.opening_balance(), dec!(10.94));
    assert_eq!(power.transactions().last().map(|t| t.amount()), Some(dec!(59.06)));
}

#[test]
fn reset_bucket_is_refunded_to_its_budget_every_period() {
    let book = three_period_book();
    let adjustments: Vec<Decimal> = book
        .reconciliations()
        .iter()
        .map(|reconciliation| {
            reconciliation
                .entry(&BucketCode::new("PHONE"))
                .and_then(|entry| {
                    entry
                        .transactions()
                        .iter()
                        .find(|t| t.narrative() == RESET_NARRATIVE)
                        .map(|t| t.amount())
                })
                .unwrap_or_default()
        })
        .collect();
    assert_eq!(adjustments, vec![dec!(86.43), dec!(-30.29), dec!(-8.57)]);
}

#[test]
fn five_period_book_has_reference_checksum() {
    let book = five_period_book();
    assert_eq!(book.reconciliations().len(), 5);
    assert_eq!(calculate_checksum(&book), dec!(8435.06));

    let totals: Vec<Decimal> = book
        .reconciliations()
        .iter()
        .map(|r| r.total_bank_balance())
        .collect();
    assert_eq!(
        totals,
        vec![dec!(600), dec!(600), dec!(662), dec!(860.05), dec!(860.05)]
    );
    let surpluses: Vec<Decimal> = book
        .reconciliations()
        .iter()
        .map(|r| r.calculated_surplus())
        .collect();
    assert_eq!(
        surpluses,
        vec![dec!(328.56), dec!(129.06), dec!(57), dec!(298.12), dec!(139.19)]
    );
    assert_eq!(balance(&book, 4, "CARMTC"), dec!(460.05));
}

#[test]
fn adjustments_apply_to_bank_totals_not_envelopes() {
    let book = five_period_book();
    let july = &book.reconciliations()[1];
    assert_eq!(july.statement_balance(), dec!(1150));
    assert_eq!(july.total_adjustments(), dec!(-550));
    assert_eq!(july.adjusted_balance("CHEQUE"), Some(dec!(150)));
    assert_eq!(july.adjusted_balance("SAVINGS"), Some(dec!(450)));
    assert!(july
        .entries()
        .iter()
        .all(|entry| entry.transactions().iter().all(|t| t.adjusted_account().is_none())));
}

#[test]
fn replayed_reference_is_not_counted_twice() {
    let book = five_period_book();
    let july_surplus = book.reconciliations()[1]
        .surplus_entry()
        .expect("surplus entry");
    assert_eq!(july_surplus.transactions().len(), 1);
    assert_eq!(
        july_surplus.transactions()[0].auto_matching_reference(),
        Some("XFER-0713")
    );

    let october = &book.reconciliations()[4];
    let with_reference = october
        .entries()
        .iter()
        .flat_map(|entry| entry.transactions())
        .filter(|t| t.auto_matching_reference() == Some("XFER-0713"))
        .count();
    assert_eq!(with_reference, 0);
}

#[test]
fn every_reconciliation_satisfies_balance_invariants() {
    for book in [three_period_book(), five_period_book()] {
        let mut previous = None;
        for reconciliation in book.reconciliations() {
            if let Some(prev) = previous {
                assert!(reconciliation.date() > prev);
            }
            previous = Some(reconciliation.date());

            let mut allocated = Decimal::ZERO;
            for entry in reconciliation.entries() {
                assert!(entry.balance() >= Decimal::ZERO);
                if !entry.is_surplus() {
                    assert_eq!(entry.opening_balance() + entry.net_change(), entry.balance());
                    allocated += entry.balance();
                }
            }
            assert_eq!(
                reconciliation.calculated_surplus(),
                reconciliation.total_bank_balance() - allocated
            );
        }
    }
}
