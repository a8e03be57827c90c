use budget_ledger::{
    core::{calculate_checksum, ReconciliationRequest},
    ledger::{
        AccountKind, BankAccount, BudgetPlan, LedgerBook, LedgerBucket, StatementTransaction,
    },
    storage::json_backend::{load_book_from_path, save_book_to_path},
};
use chrono::{Months, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rust_decimal::Decimal;
use tempfile::tempdir;

const BUCKETS: usize = 40;
const MONTHS: u32 = 24;

fn cheque() -> BankAccount {
    BankAccount::new("CHEQUE", "Cheque", AccountKind::Cheque)
}

fn month(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 15)
        .and_then(|start| start.checked_add_months(Months::new(offset)))
        .expect("valid month")
}

fn build_fixture() -> (LedgerBook, BudgetPlan, Vec<StatementTransaction>) {
    let mut book = LedgerBook::new("Benchmark", cheque());
    let mut plan = BudgetPlan::monthly();
    for idx in 0..BUCKETS {
        let code = format!("B{idx:02}");
        let bucket = if idx % 4 == 0 {
            LedgerBucket::reset_each_period(code.as_str(), cheque())
        } else {
            LedgerBucket::accumulating(code.as_str(), cheque())
        };
        book.register_bucket(bucket).expect("register bucket");
        plan = plan.with(code.as_str(), Decimal::from(50 + idx as i64));
    }

    let mut statement = Vec::new();
    for offset in 0..=MONTHS {
        let base = month(offset);
        for idx in 0..BUCKETS * 5 {
            let code = format!("B{:02}", idx % BUCKETS);
            let on = base - chrono::Duration::days((idx % 28) as i64 + 1);
            statement.push(
                StatementTransaction::new(code.as_str(), "CHEQUE", Decimal::new(-1250 - idx as i64, 2), on, "Spend")
                    .with_reference(format!("R{offset}-{idx}")),
            );
        }
    }

    for offset in 0..MONTHS {
        let request = ReconciliationRequest::new(month(offset)).with_balance(cheque(), Decimal::from(20_000));
        book.reconcile(&request, &plan, &statement).expect("reconcile");
    }
    (book, plan, statement)
}

fn bench_reconcile(c: &mut Criterion) {
    let (book, plan, statement) = build_fixture();
    let request = ReconciliationRequest::new(month(MONTHS)).with_balance(cheque(), Decimal::from(20_000));

    c.bench_function("reconcile_next_month", |b| {
        b.iter_batched(
            || book.clone(),
            |mut book| {
                book.reconcile(&request, &plan, &statement).expect("reconcile");
                black_box(book);
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("checksum_24_months", |b| {
        b.iter(|| black_box(calculate_checksum(&book)))
    });
}

fn bench_book_io(c: &mut Criterion) {
    let (mut book, _, _) = build_fixture();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("book.json");

    c.bench_function("book_save", |b| {
        b.iter(|| save_book_to_path(&mut book, &path).expect("save book"))
    });

    c.bench_function("book_load", |b| {
        b.iter(|| black_box(load_book_from_path(&path).expect("load book")))
    });
}

criterion_group!(benches, bench_reconcile, bench_book_io);
criterion_main!(benches);
