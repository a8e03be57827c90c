#![doc(test(attr(deny(warnings))))]

//! Budget Ledger is an envelope-budgeting reconciliation engine: it keeps an ordered history of
//! reconciliations that split real bank balances across budget envelopes and a derived surplus,
//! and persists that history with a checksum that detects silent corruption.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use errors::{LedgerError, Result};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "Budget ledger tracing initialized.");
    });
}
