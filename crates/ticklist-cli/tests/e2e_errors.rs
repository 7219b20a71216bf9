//! E2E CLI tests for failure paths: out-of-range indices, unreadable
//! stores, and the structured error output contract.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn store_file(dir: &Path) -> PathBuf {
    dir.join("todos.json")
}

fn tl_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tl"));
    cmd.current_dir(dir);
    cmd.env("TICKLIST_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join("config"));
    cmd.env("HOME", dir);
    cmd.env_remove("FORMAT");
    cmd.env_remove("TICKLIST_FILE");
    cmd.arg("--file").arg(store_file(dir));
    cmd
}

fn seeded(texts: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    tl_cmd(dir.path()).arg("add").args(texts).assert().success();
    dir
}

#[test]
fn out_of_range_toggle_fails_with_code() {
    let dir = seeded(&["a", "b"]);
    let before = std::fs::read(store_file(dir.path())).expect("read");

    tl_cmd(dir.path())
        .args(["toggle", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2001]"))
        .stderr(predicate::str::contains("suggestion:"));

    assert_eq!(std::fs::read(store_file(dir.path())).expect("read"), before);
}

#[test]
fn out_of_range_errors_are_json_when_requested() {
    let dir = seeded(&["only"]);

    let output = tl_cmd(dir.path())
        .args(["rm", "5", "--json"])
        .output()
        .expect("tl should not crash");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let json: Value = serde_json::from_slice(&output.stderr).expect("json error on stderr");
    assert_eq!(json["error"]["error_code"], "E2001");
    assert!(
        json["error"]["message"]
            .as_str()
            .expect("message")
            .contains('5')
    );
}

#[test]
fn show_out_of_range_on_empty_list() {
    let dir = TempDir::new().expect("tempdir");
    tl_cmd(dir.path())
        .args(["show", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn negative_index_is_a_usage_error() {
    let dir = seeded(&["a"]);
    tl_cmd(dir.path())
        .args(["toggle", "-1"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn corrupt_store_is_reported_and_left_alone() {
    let dir = TempDir::new().expect("tempdir");
    let path = store_file(dir.path());
    std::fs::write(&path, "{ not json").expect("write");

    tl_cmd(dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E3001]"));

    tl_cmd(dir.path())
        .args(["add", "would overwrite"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3001"));

    assert_eq!(std::fs::read_to_string(&path).expect("read"), "{ not json");
}

#[test]
fn foreign_document_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        store_file(dir.path()),
        r#"{"format":"something-else","version":1,"items":[]}"#,
    )
    .expect("write");

    tl_cmd(dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3002"));
}

#[test]
fn import_of_missing_file_fails_without_touching_store() {
    let dir = seeded(&["a"]);
    let before = std::fs::read(store_file(dir.path())).expect("read");

    tl_cmd(dir.path())
        .args(["import", "does-not-exist.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.md"));

    assert_eq!(std::fs::read(store_file(dir.path())).expect("read"), before);
}

#[test]
fn invalid_user_config_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let config_dir = dir.path().join("config").join("ticklist");
    std::fs::create_dir_all(&config_dir).expect("mkdir");
    std::fs::write(config_dir.join("config.toml"), "output = [").expect("write");

    tl_cmd(dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1002]"))
        .stderr(predicate::str::contains("config.toml"));
}
