use std::path::Path;
use std::process::{Command, Output};

use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn run_todo(db: &Path, args: &[&str]) -> Output {
    let binary = assert_cmd::cargo::cargo_bin!("todo");
    let mut cmd = Command::new(binary);
    cmd.env("NO_COLOR", "1")
        .env_remove("TODO_LOG")
        .arg("--db")
        .arg(db)
        .args(args);
    cmd.output().expect("todo command executes")
}

fn run_todo_ok(db: &Path, args: &[&str]) -> String {
    let output = run_todo(db, args);
    assert!(
        output.status.success(),
        "todo {:?} failed:\nstdout:\n{}\nstderr:\n{}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn run_todo_json(db: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--format", "json"];
    full.extend_from_slice(args);
    let stdout = run_todo_ok(db, &full);
    serde_json::from_str(&stdout).expect("valid json stdout")
}

#[test]
fn add_list_and_complete_by_label() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("todo.db");

    run_todo_ok(&db, &["add", "buy", "milk", "--due", "2024-01-01", "--tag", "#home"]);
    run_todo_ok(&db, &["add", "call", "bank", "--due", "2024-01-01"]);

    let listing = run_todo_ok(&db, &["list"]);
    assert!(listing.contains("Pending"));
    assert!(listing.contains("1. 01 Jan - Buy milk"));
    assert!(listing.contains("2. 01 Jan - Call bank"));

    let done = run_todo_json(&db, &["done", "1"]);
    assert_eq!(done["title"], "Buy milk");
    assert_eq!(done["done"], true);
    assert_eq!(done["effort"], 1.0);
    assert_eq!(done["tags"], serde_json::json!(["home"]));

    let pending = run_todo_json(&db, &["list"]);
    let rows = pending.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["label"], "1");
    assert_eq!(rows[0]["title"], "Call bank");

    let day = run_todo_ok(&db, &["list", "2024-01-01"]);
    assert!(day.contains("[X] (1.0) Buy milk"));
    assert!(day.contains("1 / 2 Todos pending"));
}

#[test]
fn bare_invocation_lists_pending() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("nested").join("todo.db");
    run_todo_ok(&db, &["add", "stretch"]);
    let out = run_todo_ok(&db, &[]);
    assert!(out.contains("1. "));
    assert!(out.contains("Stretch"));
}

#[test]
fn update_and_delete_by_id() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("todo.db");
    let created = run_todo_json(&db, &["add", "draft", "report", "--due", "2024-02-01"]);
    let id = created["id"].as_str().unwrap().to_string();

    let updated = run_todo_json(
        &db,
        &["update", &id, "--title", "final report", "--due", "2024-02-02", "--effort", "3"],
    );
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["title"], "Final report");
    assert_eq!(updated["due"], "2024-02-02");
    assert_eq!(updated["effort"], 3.0);

    let old_day = run_todo_json(&db, &["list", "2024-02-01"]);
    assert!(old_day.as_array().unwrap().is_empty());

    run_todo_ok(&db, &["delete", &id]);
    let output = run_todo(&db, &["--format", "json", "show", &id]);
    assert!(!output.status.success());
    let err: Value = serde_json::from_slice(&output.stderr).expect("json error on stderr");
    assert_eq!(err["error"], "task_not_found");
}

#[test]
fn unknown_label_fails_with_message() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("todo.db");
    run_todo_ok(&db, &["list"]);

    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("todo"))
        .env("NO_COLOR", "1")
        .arg("--db")
        .arg(&db)
        .args(["show", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no task is listed under label '4'"));
}

#[test]
fn invalid_date_is_rejected_by_argument_parsing() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("todo.db");
    let output = run_todo(&db, &["add", "x", "--due", "someday"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("someday"));
}

#[test]
fn doctor_reports_healthy_store_and_reindex_counts() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("todo.db");
    run_todo_ok(&db, &["add", "one"]);
    run_todo_ok(&db, &["add", "two"]);

    let report = run_todo_json(&db, &["doctor"]);
    assert_eq!(report["ok"], true);

    let output = run_todo(&db, &["reindex"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Reindexed 2 tasks"));
}
