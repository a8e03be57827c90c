//! Non-interactive command line front end for inspecting persisted ledger books.

pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::{
    config::ConfigManager,
    core::{calculate_checksum, LedgerCalculation, LedgerFilter},
    currency::format_amount,
    errors::LedgerError,
    ledger::{BucketCode, LedgerBook},
    storage::{json_backend::load_book_from_path, JsonStorage, StorageBackend},
    utils::build_info,
};

#[derive(Debug, Parser)]
#[command(name = "budget_ledger_cli", author, version, about, long_about = None)]
pub struct Cli {
    /// Ledger book document to open.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub file: Option<PathBuf>,
    /// Name of a managed book in the application data directory.
    #[arg(short, long, global = true)]
    pub book: Option<String>,
    /// Disable coloured output.
    #[arg(long, global = true)]
    pub plain: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bank, envelope and surplus balances of the latest reconciliation.
    Summary,
    /// Load the book, verifying its checksum and structure.
    Verify,
    /// Closing balance of one envelope across every reconciliation.
    History { bucket: String },
    /// Non-fatal anomalies in the book.
    Warnings,
    /// Build information.
    Version,
}

pub fn run_cli() -> Result<(), LedgerError> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<(), LedgerError> {
    output::set_plain(cli.plain);
    match &cli.command {
        Commands::Version => {
            output::info(build_info());
            Ok(())
        }
        Commands::Summary => summary(&open_book(&cli)?),
        Commands::Verify => {
            let book = open_book(&cli)?;
            output::success(format!(
                "{}: {} reconciliations, checksum {} verified",
                book.name(),
                book.reconciliations().len(),
                calculate_checksum(&book)
            ));
            Ok(())
        }
        Commands::History { bucket } => history(&open_book(&cli)?, &BucketCode::new(bucket)),
        Commands::Warnings => {
            let book = open_book(&cli)?;
            let warnings = book.warnings();
            if warnings.is_empty() {
                output::success("No warnings.");
            }
            for warning in warnings {
                output::warning(warning);
            }
            Ok(())
        }
    }
}

fn open_book(cli: &Cli) -> Result<LedgerBook, LedgerError> {
    if let Some(path) = &cli.file {
        debug!(path = %path.display(), "opening ledger file");
        return load_book_from_path(path);
    }
    let config = ConfigManager::new()?;
    let name = match &cli.book {
        Some(name) => name.clone(),
        None => config.load()?.last_opened_book.ok_or_else(|| {
            LedgerError::InvalidInput("no ledger book given; pass --file or --book".into())
        })?,
    };
    let book = JsonStorage::new_default()?.load(&name)?;
    config.remember_book(&name)?;
    Ok(book)
}

fn summary(book: &LedgerBook) -> Result<(), LedgerError> {
    output::section(book.name());
    let Some(latest) = book.latest() else {
        output::info("No reconciliations yet.");
        return Ok(());
    };
    output::info(format!("Reconciled {} ({})", latest.date(), latest.state()));
    if !latest.remarks().is_empty() {
        output::info(latest.remarks());
    }

    output::section("Bank accounts");
    for balance in latest.bank_balances() {
        let adjusted = latest
            .adjusted_balance(&balance.account.code)
            .unwrap_or(balance.balance);
        output::info(format!(
            "{:<28} {:>14}",
            balance.account.to_string(),
            format_amount(adjusted)
        ));
    }
    output::info(format!(
        "{:<28} {:>14}",
        "Total",
        format_amount(latest.total_bank_balance())
    ));

    output::section("Envelopes");
    for entry in latest.entries() {
        let line = format!("{:<28} {:>14}", entry.bucket(), format_amount(entry.balance()));
        if entry.absorbed_shortfall() {
            output::warning(format!("{line}  overspent"));
        } else {
            output::info(line);
        }
    }
    if let Some(surplus) = LedgerCalculation::surplus(Some(book), &LedgerFilter::all()) {
        output::info(format!("{:<28} {:>14}", "Calculated surplus", format_amount(surplus)));
    }
    output::info(format!("Checksum {}", calculate_checksum(book)));
    Ok(())
}

fn history(book: &LedgerBook, bucket: &BucketCode) -> Result<(), LedgerError> {
    if book.bucket(bucket).is_none() {
        return Err(LedgerError::UnknownBucket(bucket.to_string()));
    }
    output::section(format!("{bucket} history"));
    for (date, balance) in LedgerCalculation::bucket_history(Some(book), bucket).unwrap_or_default() {
        output::info(format!("{date}  {:>14}", format_amount(balance)));
    }
    Ok(())
}
