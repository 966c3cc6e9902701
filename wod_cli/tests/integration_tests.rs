//! Integration tests for the wodpick binary.
//!
//! These tests verify end-to-end behavior including:
//! - Pool generation and idempotence
//! - Selection and logging workflow
//! - Enable/disable toggles
//! - CSV rollup operations

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("wodpick"))
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout pool selection system"));
}

#[test]
fn test_generate_populates_pool() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("generate")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated"));

    let store_path = data_dir.join("pool.json");
    assert!(store_path.exists());
    let contents = fs::read_to_string(&store_path).expect("Failed to read store");
    assert!(contents.contains("cadence_days"));
}

#[test]
fn test_generate_is_idempotent() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("generate")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    cli()
        .arg("generate")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("already populated"));
}

#[test]
fn test_today_auto_complete_logs_workout() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("today")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--auto-complete")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout logged"));

    let journal_path = data_dir.join("journal/performed.jsonl");
    let journal = fs::read_to_string(&journal_path).expect("Failed to read journal");
    assert!(!journal.is_empty());
    assert!(journal.contains("entry_id"));
}

#[test]
fn test_today_dry_run_does_not_log() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("today")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(!data_dir.join("journal/performed.jsonl").exists());
}

#[test]
fn test_today_seed_is_reproducible() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("generate")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    let run = || {
        let output = cli()
            .arg("today")
            .arg("--data-dir")
            .arg(&data_dir)
            .arg("--seed")
            .arg("1234")
            .arg("--dry-run")
            .output()
            .expect("Failed to run");
        String::from_utf8(output.stdout).unwrap()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_intensity_preference() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("today")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--intensity")
        .arg("low")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Low"));
}

#[test]
fn test_list_shows_entries() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("generate")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("pool entries"))
        .stdout(predicate::str::contains("never"));
}

#[test]
fn test_list_empty_pool() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Pool is empty"));
}

#[test]
fn test_disable_and_enable_entry() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("generate")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    // Grab an entry id from the store
    let store: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(data_dir.join("pool.json")).expect("Failed to read store"),
    )
    .expect("Invalid store JSON");
    let entry_id = store["entries"]
        .as_object()
        .unwrap()
        .keys()
        .next()
        .unwrap()
        .clone();

    cli()
        .arg("disable")
        .arg(&entry_id)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Disabled"));

    cli()
        .arg("list")
        .arg("--all")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("[disabled]"));

    cli()
        .arg("enable")
        .arg(&entry_id)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Enabled"));
}

#[test]
fn test_toggle_unknown_entry_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("disable")
        .arg("no_such_entry")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn test_rollup_creates_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("today")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--auto-complete")
        .assert()
        .success();

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 1"));

    assert!(data_dir.join("performed.csv").exists());
    assert!(!data_dir.join("journal/performed.jsonl").exists());
}

#[test]
fn test_rollup_without_journal() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}

#[test]
fn test_history_after_workout() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("today")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--auto-complete")
        .assert()
        .success();

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("workouts in the last 30 days"));
}

#[test]
fn test_history_empty() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts performed"));
}

#[test]
fn test_completed_workout_updates_cadence_state() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("today")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--auto-complete")
        .assert()
        .success();

    let store: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(data_dir.join("pool.json")).expect("Failed to read store"),
    )
    .expect("Invalid store JSON");

    // Exactly one entry was performed, and its movements' cadence records
    // carry the same timestamp
    let performed: Vec<_> = store["entries"]
        .as_object()
        .unwrap()
        .values()
        .filter(|e| !e["last_performed"].is_null())
        .collect();
    assert_eq!(performed.len(), 1);

    let entry = performed[0];
    let entry_ts = entry["last_performed"].as_str().unwrap();
    for slot in entry["movements"].as_array().unwrap() {
        let movement_id = slot["movement_id"].as_str().unwrap();
        let record = &store["cadence"][movement_id];
        assert_eq!(
            record["last_performed_at"].as_str().unwrap(),
            entry_ts,
            "movement {} out of step with entry",
            movement_id
        );
    }
}
