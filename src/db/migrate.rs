use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists. It also records applied migrations.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Base schema: schedules, dispensers, refill history.
fn create_fleet_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schedules (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT NOT NULL,
            kind          TEXT NOT NULL,
            ml_per_hour   REAL,
            days_of_week  TEXT NOT NULL DEFAULT 'mon,tue,wed,thu,fri,sat,sun',
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS dispensers (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            name                 TEXT NOT NULL,
            refill_capacity_ml   REAL NOT NULL CHECK(refill_capacity_ml >= 0),
            current_level_ml     REAL,
            last_refill_date     TEXT,
            current_schedule_id  INTEGER REFERENCES schedules(id) ON DELETE SET NULL,
            ml_per_hour          REAL,
            created_at           TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS refill_logs (
            id                      INTEGER PRIMARY KEY AUTOINCREMENT,
            dispenser_id            INTEGER NOT NULL REFERENCES dispensers(id) ON DELETE CASCADE,
            timestamp               TEXT NOT NULL,
            level_before_refill_ml  REAL NOT NULL,
            refill_amount_ml        REAL NOT NULL,
            current_ml_refill       REAL NOT NULL,
            notes                   TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_refill_logs_dispenser ON refill_logs(dispenser_id, timestamp);
        "#,
    )?;
    Ok(())
}

fn add_dispenser_location(conn: &Connection) -> Result<()> {
    if !column_exists(conn, "dispensers", "location")? {
        conn.execute(
            "ALTER TABLE dispensers ADD COLUMN location TEXT NOT NULL DEFAULT ''",
            [],
        )?;
    }
    Ok(())
}

type Step = fn(&Connection) -> Result<()>;

const MIGRATIONS: &[(&str, &str, Step)] = &[
    (
        "20250301_0001_create_fleet_tables",
        "Created schedules, dispensers and refill_logs tables",
        create_fleet_tables,
    ),
    (
        "20250412_0002_add_dispenser_location",
        "Added location column to dispensers",
        add_dispenser_location,
    ),
];

/// Public entry point: run all pending migrations.
///
/// Invoked whenever a store is opened; already applied
/// steps are skipped.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    for (version, message, step) in MIGRATIONS {
        if is_applied(conn, version)? {
            continue;
        }

        step(conn).map_err(|e| AppError::Migration(format!("{version}: {e}")))?;
        mark_applied(conn, version, message)?;
        tracing::info!(version, "migration applied");
        success(format!("Migration applied: {version}"));
    }

    Ok(())
}
