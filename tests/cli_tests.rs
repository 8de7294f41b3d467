use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{init_db_with_data, setup_test_db, sf, temp_out};

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("init");

    sf().args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(std::path::Path::new(&db_path).exists());

    // running it twice is harmless
    sf().args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();
}

#[test]
fn test_schedule_add_reports_daily_usage() {
    let db_path = setup_test_db("schedule_add");
    sf().args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    sf().args([
        "--db",
        &db_path,
        "schedule",
        "add",
        "--name",
        "late",
        "--range",
        "22:00-02:00/10/50",
        "--days",
        "mon,fri",
    ])
    .assert()
    .success()
    .stdout(contains("240.0 ml/day"));

    sf().args(["--db", &db_path, "schedule", "list"])
        .assert()
        .success()
        .stdout(contains("late").and(contains("mon,fri")).and(contains("04:00")));

    sf().args(["--db", &db_path, "schedule", "show", "--id", "1"])
        .assert()
        .success()
        .stdout(contains("(+1d)").and(contains("Daily usage : 240.0 ml")));
}

#[test]
fn test_interval_schedule_with_rate() {
    let db_path = setup_test_db("schedule_interval");
    sf().args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    sf().args([
        "--db",
        &db_path,
        "schedule",
        "add",
        "--name",
        "pulse",
        "--interval",
        "20/40",
        "--duration",
        "30",
        "--cycles",
        "3",
        "--ml-per-hour",
        "5",
    ])
    .assert()
    .success()
    .stdout(contains("interval schedule").and(contains("0.1 ml/day")));
}

#[test]
fn test_schedule_rejects_both_shapes() {
    let db_path = setup_test_db("schedule_both");
    sf().args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    sf().args([
        "--db",
        &db_path,
        "schedule",
        "add",
        "--name",
        "mixed",
        "--range",
        "08:00-09:00/5/5",
        "--interval",
        "5/5",
    ])
    .assert()
    .failure();
}

#[test]
fn test_refill_over_capacity_is_rejected() {
    let db_path = setup_test_db("refill_reject");
    init_db_with_data(&db_path);

    sf().args(["--db", &db_path, "refill", "--id", "1", "--amount", "30"])
        .assert()
        .failure()
        .stderr(contains("at most 20.0 ml"));

    // nothing was written
    sf().args(["--db", &db_path, "refills"])
        .assert()
        .success()
        .stdout(contains("No refills recorded"));
}

#[test]
fn test_refill_within_capacity_is_accepted() {
    let db_path = setup_test_db("refill_accept");
    init_db_with_data(&db_path);

    sf().args([
        "--db",
        &db_path,
        "refill",
        "--id",
        "1",
        "--amount",
        "15",
        "--notes",
        "top up",
    ])
    .assert()
    .success()
    .stdout(contains("480.0 ml + 15.0 ml = 495.0 ml").and(contains("Current level: 495.0 ml")));

    sf().args(["--db", &db_path, "level", "--id", "1"])
        .assert()
        .success()
        .stdout(contains("495.0 ml of 500.0 ml").and(contains("Refills logged : 1")));

    sf().args(["--db", &db_path, "refills", "--id", "1"])
        .assert()
        .success()
        .stdout(contains("top up"));
}

#[test]
fn test_refill_negative_amount_is_invalid() {
    let db_path = setup_test_db("refill_negative");
    init_db_with_data(&db_path);

    sf().args(["--db", &db_path, "refill", "--id", "1", "--amount", "-5"])
        .assert()
        .failure()
        .stderr(contains("Invalid input"));
}

#[test]
fn test_refill_unknown_dispenser() {
    let db_path = setup_test_db("refill_unknown");
    init_db_with_data(&db_path);

    sf().args(["--db", &db_path, "refill", "--id", "42", "--amount", "5"])
        .assert()
        .failure()
        .stderr(contains("Dispenser #42 does not exist"));
}

#[test]
fn test_level_decays_after_refill() {
    let db_path = setup_test_db("level_decay");
    init_db_with_data(&db_path);

    sf().args([
        "--db",
        &db_path,
        "dispenser",
        "add",
        "--name",
        "hall",
        "--capacity",
        "1000",
        "--schedule",
        "1",
    ])
    .assert()
    .success();

    // unknown level: assumed full, no decay yet
    sf().args(["--db", &db_path, "level", "--id", "2", "--at", "2030-01-01T00:00:00Z"])
        .assert()
        .success()
        .stdout(contains("1000.0 ml of 1000.0 ml").and(contains("no decay")));

    // first logged refill starts the decay clock
    sf().args([
        "--db",
        &db_path,
        "refill",
        "--id",
        "2",
        "--amount",
        "1",
        "--captured",
        "999",
        "--at",
        "2030-01-01T00:00:00Z",
    ])
    .assert()
    .success()
    .stdout(contains("= 1000.0 ml"));

    // 720 ml/day, half a day later
    sf().args(["--db", &db_path, "level", "--id", "2", "--at", "2030-01-01T12:00:00Z"])
        .assert()
        .success()
        .stdout(contains("640.0 ml of 1000.0 ml").and(contains("usage service")));

    sf().args([
        "--db",
        &db_path,
        "level",
        "--id",
        "2",
        "--at",
        "2030-01-01T12:00:00Z",
        "--local",
    ])
    .assert()
    .success()
    .stdout(contains("640.0 ml").and(contains("local estimate")));

    sf().args(["--db", &db_path, "usage", "--id", "2", "--at", "2030-01-02T00:00:00Z"])
        .assert()
        .success()
        .stdout(contains("Since refill : 720.0 ml"));

    // never below zero
    sf().args(["--db", &db_path, "level", "--id", "2", "--at", "2032-09-27T00:00:00Z"])
        .assert()
        .success()
        .stdout(contains("Current level  : 0.0 ml"));
}

#[test]
fn test_dispenser_list_and_assign() {
    let db_path = setup_test_db("dispenser_list");
    init_db_with_data(&db_path);

    sf().args(["--db", &db_path, "dispenser", "assign", "--id", "1", "--schedule", "1"])
        .assert()
        .success()
        .stdout(contains("schedule #1"));

    sf().args(["--db", &db_path, "dispenser", "list"])
        .assert()
        .success()
        .stdout(contains("lobby").and(contains("#1 night")));

    sf().args(["--db", &db_path, "dispenser", "assign", "--id", "1", "--schedule", "9"])
        .assert()
        .failure()
        .stderr(contains("Schedule #9 does not exist"));

    sf().args(["--db", &db_path, "dispenser", "assign", "--id", "1", "--schedule", "none"])
        .assert()
        .success();
}

#[test]
fn test_dispenser_add_validates_level() {
    let db_path = setup_test_db("dispenser_validate");
    sf().args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    sf().args([
        "--db",
        &db_path,
        "dispenser",
        "add",
        "--name",
        "bad",
        "--capacity",
        "100",
        "--level",
        "150",
    ])
    .assert()
    .failure()
    .stderr(contains("outside"));
}

#[test]
fn test_export_json_and_csv() {
    let db_path = setup_test_db("export");
    init_db_with_data(&db_path);

    sf().args(["--db", &db_path, "refill", "--id", "1", "--amount", "10"])
        .assert()
        .success();

    let json_out = temp_out("export_refills", "json");
    sf().args([
        "--db", &db_path, "export", "--format", "json", "--file", &json_out, "--force",
    ])
    .assert()
    .success();
    let content = fs::read_to_string(&json_out).expect("json written");
    assert!(content.contains("\"level_after_ml\": 490.0"));
    assert!(content.contains("\"dispenser\": \"lobby\""));

    let csv_out = temp_out("export_refills", "csv");
    sf().args([
        "--db", &db_path, "export", "--format", "csv", "--file", &csv_out, "--force",
    ])
    .assert()
    .success();
    let content = fs::read_to_string(&csv_out).expect("csv written");
    assert!(content.starts_with("id,dispenser_id,dispenser,timestamp"));
}

#[test]
fn test_export_requires_absolute_path() {
    let db_path = setup_test_db("export_relative");
    init_db_with_data(&db_path);

    sf().args(["--db", &db_path, "export", "--file", "relative.csv"])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

#[test]
fn test_audit_log_records_operations() {
    let db_path = setup_test_db("audit_log");
    init_db_with_data(&db_path);

    sf().args(["--db", &db_path, "refill", "--id", "1", "--amount", "5"])
        .assert()
        .success();

    sf().args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(
            contains("schedule_add")
                .and(contains("dispenser_add"))
                .and(contains("refill"))
                .and(contains("migration_applied")),
        );
}
