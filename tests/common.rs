#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn sf() -> Command {
    let mut cmd = cargo_bin_cmd!("scentfleet");
    cmd.env("SCENTFLEET_LOG", "error");
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_scentfleet.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize DB with one 720 ml/day schedule (#1) and one unscheduled
/// dispenser (#1, 480 of 500 ml).
pub fn init_db_with_data(db_path: &str) {
    sf().args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    sf().args([
        "--db",
        db_path,
        "schedule",
        "add",
        "--name",
        "night",
        "--range",
        "00:00-06:00/20/40",
    ])
    .assert()
    .success();

    sf().args([
        "--db",
        db_path,
        "dispenser",
        "add",
        "--name",
        "lobby",
        "--capacity",
        "500",
        "--level",
        "480",
    ])
    .assert()
    .success();
}
