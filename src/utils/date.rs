use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local, NaiveDateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Accepts RFC 3339 ("2025-06-18T09:30:00Z") or a local "YYYY-MM-DD HH:MM".
pub fn parse_timestamp(s: &str) -> AppResult<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return naive
                .and_local_timezone(Local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| AppError::InvalidTimestamp(s.to_string()));
        }
    }

    Err(AppError::InvalidTimestamp(s.to_string()))
}

/// Optional CLI timestamp, defaulting to the current instant.
pub fn parse_at(input: Option<&String>) -> AppResult<DateTime<Utc>> {
    match input {
        Some(s) => parse_timestamp(s),
        None => Ok(now()),
    }
}

/// Storage format (RFC 3339, UTC, millisecond precision).
pub fn to_db(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn from_db(s: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::InvalidTimestamp(s.to_string()))
}

/// Human format in the local timezone.
pub fn display(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
