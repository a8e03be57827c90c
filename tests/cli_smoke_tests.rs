mod common;

use assert_cmd::Command;
use assert_fs::{prelude::*, TempDir};
use budget_ledger::storage::{json_backend::save_book_to_path, JsonStorage, StorageBackend};
use common::{five_period_book, three_period_book};
use predicates::{prelude::PredicateBooleanExt, str::contains};

const BIN_NAME: &str = "budget_ledger_cli";

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("BUDGET_LEDGER_HOME", home.path()).arg("--plain");
    cmd
}

fn write_book(home: &TempDir, file: &str, five_period: bool) -> std::path::PathBuf {
    let child = home.child(file);
    let mut book = if five_period {
        five_period_book()
    } else {
        three_period_book()
    };
    save_book_to_path(&mut book, child.path()).expect("write book");
    child.path().to_path_buf()
}

#[test]
fn version_command_prints_build_info() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(contains("budget_ledger"));
}

#[test]
fn summary_lists_envelopes_and_surplus() {
    let home = TempDir::new().unwrap();
    let path = write_book(&home, "household.json", false);
    cli(&home)
        .arg("summary")
        .arg("--file")
        .arg(&path)
        .assert()
        .success()
        .stdout(
            contains("POWER")
                .and(contains("overspent"))
                .and(contains("3,145.00"))
                .and(contains("Checksum 19155")),
        );
}

#[test]
fn verify_reports_checksum_of_multi_account_book() {
    let home = TempDir::new().unwrap();
    let path = write_book(&home, "multi.json", true);
    cli(&home)
        .args(["verify", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("5 reconciliations").and(contains("8435.06")));
}

#[test]
fn verify_fails_on_tampered_document() {
    let home = TempDir::new().unwrap();
    let path = write_book(&home, "household.json", false);
    let raw = std::fs::read_to_string(&path).unwrap();
    let tampered = raw.replacen("\"2500\"", "\"2600\"", 1);
    assert_ne!(raw, tampered);
    std::fs::write(&path, tampered).unwrap();

    cli(&home)
        .args(["verify", "--file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("Checksum mismatch"));
}

#[test]
fn history_of_unknown_bucket_fails() {
    let home = TempDir::new().unwrap();
    let path = write_book(&home, "household.json", false);
    cli(&home)
        .args(["history", "GHOST", "--file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("Unknown ledger bucket"));
}

#[test]
fn history_prints_one_line_per_reconciliation() {
    let home = TempDir::new().unwrap();
    let path = write_book(&home, "household.json", false);
    cli(&home)
        .args(["history", "haircut", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(
            contains("2013-06-15")
                .and(contains("2013-07-15"))
                .and(contains("65.00")),
        );
}

#[test]
fn missing_book_argument_is_reported() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .arg("summary")
        .assert()
        .failure()
        .stderr(contains("no ledger book given"));
}

#[test]
fn book_opened_by_name_becomes_the_default() {
    let home = TempDir::new().unwrap();
    let storage = JsonStorage::new(Some(home.path().to_path_buf()), None).unwrap();
    let mut book = three_period_book();
    storage.save(&mut book, "household").unwrap();

    cli(&home)
        .args(["verify", "--book", "household"])
        .assert()
        .success();
    cli(&home)
        .arg("verify")
        .assert()
        .success()
        .stdout(contains("3 reconciliations").and(contains("19155")));
}
