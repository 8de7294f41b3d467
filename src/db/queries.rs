use crate::errors::{AppError, AppResult};
use crate::models::{Dispenser, RefillLog, RefillPayload, Schedule, ScheduleKind, WeekdaySet};
use crate::utils::date;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn ts_column(row: &Row, name: &str) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(name)?;
    raw.map(|s| date::from_db(&s).map_err(|e| conversion_error(0, e)))
        .transpose()
}

// ---------------------------
// Schedules
// ---------------------------

pub fn map_schedule(row: &Row) -> Result<Schedule> {
    let kind_json: String = row.get("kind")?;
    let kind: ScheduleKind =
        serde_json::from_str(&kind_json).map_err(|e| conversion_error(0, AppError::Json(e)))?;

    let days_str: String = row.get("days_of_week")?;
    let days_of_week = if days_str.is_empty() {
        WeekdaySet::none()
    } else {
        WeekdaySet::parse(&days_str).map_err(|e| conversion_error(0, e))?
    };

    Ok(Schedule {
        id: row.get("id")?,
        name: row.get("name")?,
        kind,
        ml_per_hour: row.get("ml_per_hour")?,
        days_of_week,
    })
}

pub fn load_schedules(conn: &Connection) -> AppResult<Vec<Schedule>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM schedules ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_schedule)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_schedule(conn: &Connection, id: i64) -> AppResult<Option<Schedule>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM schedules WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_schedule).optional()?)
}

pub fn insert_schedule(conn: &Connection, s: &Schedule) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO schedules (name, kind, ml_per_hour, days_of_week, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            s.name,
            serde_json::to_string(&s.kind)?,
            s.ml_per_hour,
            s.days_of_week.to_db_str(),
            date::to_db(&date::now()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_schedule(conn: &Connection, id: i64) -> AppResult<bool> {
    let n = conn.execute("DELETE FROM schedules WHERE id = ?1", [id])?;
    Ok(n > 0)
}

// ---------------------------
// Dispensers
// ---------------------------

pub fn map_dispenser(row: &Row) -> Result<Dispenser> {
    Ok(Dispenser {
        id: row.get("id")?,
        name: row.get("name")?,
        location: row.get("location")?,
        refill_capacity_ml: row.get("refill_capacity_ml")?,
        current_level_ml: row.get("current_level_ml")?,
        last_refill_date: ts_column(row, "last_refill_date")?,
        current_schedule_id: row.get("current_schedule_id")?,
        ml_per_hour: row.get("ml_per_hour")?,
    })
}

pub fn load_dispensers(conn: &Connection) -> AppResult<Vec<Dispenser>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM dispensers ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_dispenser)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_dispenser(conn: &Connection, id: i64) -> AppResult<Option<Dispenser>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM dispensers WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_dispenser).optional()?)
}

pub fn insert_dispenser(conn: &Connection, d: &Dispenser) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO dispensers (name, location, refill_capacity_ml, current_level_ml,
                                 last_refill_date, current_schedule_id, ml_per_hour, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            d.name,
            d.location,
            d.refill_capacity_ml,
            d.current_level_ml,
            d.last_refill_date.as_ref().map(date::to_db),
            d.current_schedule_id,
            d.ml_per_hour,
            date::to_db(&date::now()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_dispenser_schedule(
    conn: &Connection,
    id: i64,
    schedule_id: Option<i64>,
) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE dispensers SET current_schedule_id = ?1 WHERE id = ?2",
        params![schedule_id, id],
    )?;
    Ok(n > 0)
}

pub fn update_dispenser_rate(conn: &Connection, id: i64, ml_per_hour: Option<f64>) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE dispensers SET ml_per_hour = ?1 WHERE id = ?2",
        params![ml_per_hour, id],
    )?;
    Ok(n > 0)
}

pub fn update_dispenser_baseline(
    conn: &Connection,
    id: i64,
    level_ml: f64,
    refilled_at: &DateTime<Utc>,
) -> AppResult<bool> {
    let n = conn.execute(
        "UPDATE dispensers SET current_level_ml = ?1, last_refill_date = ?2 WHERE id = ?3",
        params![level_ml, date::to_db(refilled_at), id],
    )?;
    Ok(n > 0)
}

pub fn delete_dispenser(conn: &Connection, id: i64) -> AppResult<bool> {
    let n = conn.execute("DELETE FROM dispensers WHERE id = ?1", [id])?;
    Ok(n > 0)
}

// ---------------------------
// Refill history (append-only)
// ---------------------------

pub fn map_refill_log(row: &Row) -> Result<RefillLog> {
    let raw_ts: String = row.get("timestamp")?;
    let timestamp = date::from_db(&raw_ts).map_err(|e| conversion_error(0, e))?;

    Ok(RefillLog {
        id: row.get("id")?,
        dispenser_id: row.get("dispenser_id")?,
        timestamp,
        level_before_refill_ml: row.get("level_before_refill_ml")?,
        refill_amount_ml: row.get("refill_amount_ml")?,
        current_ml_refill: row.get("current_ml_refill")?,
        notes: row.get("notes")?,
    })
}

pub fn load_refill_logs(conn: &Connection, dispenser_id: Option<i64>) -> AppResult<Vec<RefillLog>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM refill_logs
         WHERE (?1 IS NULL OR dispenser_id = ?1)
         ORDER BY timestamp ASC, id ASC",
    )?;
    let rows = stmt.query_map([dispenser_id], map_refill_log)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_refill_log(conn: &Connection, dispenser_id: i64, p: &RefillPayload) -> AppResult<RefillLog> {
    conn.execute(
        "INSERT INTO refill_logs (dispenser_id, timestamp, level_before_refill_ml,
                                  refill_amount_ml, current_ml_refill, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            dispenser_id,
            date::to_db(&p.timestamp),
            p.level_before_refill_ml,
            p.refill_amount_ml,
            p.current_ml_refill,
            p.notes,
        ],
    )?;

    Ok(RefillLog {
        id: conn.last_insert_rowid(),
        dispenser_id,
        timestamp: p.timestamp,
        level_before_refill_ml: p.level_before_refill_ml,
        refill_amount_ml: p.refill_amount_ml,
        current_ml_refill: p.current_ml_refill,
        notes: p.notes.clone(),
    })
}
