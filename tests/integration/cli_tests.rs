//! End-to-end CLI tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn leakflow() -> Command {
    Command::cargo_bin("leakflow").expect("binary should build")
}

const LEAKY_JAVA: &str = r#"
package com.example;

import android.database.Cursor;
import android.database.sqlite.SQLiteDatabase;

public class Repo {
    public int count(SQLiteDatabase db) {
        Cursor cursor = db.rawQuery("SELECT * FROM items", null);
        return cursor.getCount();
    }
}
"#;

const CLEAN_JAVA: &str = r#"
package com.example;

import android.database.Cursor;
import android.database.sqlite.SQLiteDatabase;

public class CleanRepo {
    public int count(SQLiteDatabase db) {
        Cursor cursor = db.rawQuery("SELECT * FROM items", null);
        int n = cursor.getCount();
        cursor.close();
        return n;
    }
}
"#;

#[test]
fn test_help() {
    leakflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resource-leak detection"));
}

#[test]
fn test_version() {
    leakflow()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_empty_project() {
    let dir = TempDir::new().unwrap();
    leakflow()
        .arg(dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("No Kotlin or Java files found"));
}

#[test]
fn test_reports_leak_as_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Repo.java"), LEAKY_JAVA).unwrap();

    leakflow()
        .arg(dir.path())
        .args(["--format", "json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RL001"))
        .stdout(predicate::str::contains("\"function\": \"count\""));
}

#[test]
fn test_clean_file_produces_no_findings() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("CleanRepo.java"), CLEAN_JAVA).unwrap();

    leakflow()
        .arg(dir.path())
        .args(["--format", "json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 0"));
}

#[test]
fn test_detect_filter_excludes_other_detectors() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Repo.java"), LEAKY_JAVA).unwrap();

    // Only the prefs-editor detector runs, so the cursor leak is invisible
    leakflow()
        .arg(dir.path())
        .args(["--detect", "prefs-editor", "--format", "json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 0"));
}

#[test]
fn test_unknown_detector_fails() {
    let dir = TempDir::new().unwrap();
    leakflow()
        .arg(dir.path())
        .args(["--detect", "bogus", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown detector"));
}

#[test]
fn test_completions() {
    leakflow()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("leakflow"));
}

#[test]
fn test_config_file_excludes() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("generated")).unwrap();
    fs::write(dir.path().join("generated/Repo.java"), LEAKY_JAVA).unwrap();
    fs::write(
        dir.path().join(".leakflow.toml"),
        "exclude = [\"generated\"]\n",
    )
    .unwrap();

    leakflow()
        .arg(dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("No Kotlin or Java files found"));
}
