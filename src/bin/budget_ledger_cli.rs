use budget_ledger::{cli::run_cli, init};

fn main() {
    init();

    if let Err(err) = run_cli() {
        budget_ledger::cli::output::error(&err);
        std::process::exit(1);
    }
}
