use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only history row for one refill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefillLog {
    pub id: i64,
    pub dispenser_id: i64,
    pub timestamp: DateTime<Utc>,
    pub level_before_refill_ml: f64,
    pub refill_amount_ml: f64,
    /// Level after the refill, already clamped to capacity.
    pub current_ml_refill: f64,
    #[serde(default)]
    pub notes: String,
}

/// What the client submits when logging a refill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefillPayload {
    pub level_before_refill_ml: f64,
    pub refill_amount_ml: f64,
    pub current_ml_refill: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

/// Flat row used by the CSV/JSON export.
#[derive(Debug, Serialize)]
pub struct RefillExport {
    pub id: i64,
    pub dispenser_id: i64,
    pub dispenser: String,
    pub timestamp: String,
    pub level_before_ml: f64,
    pub amount_ml: f64,
    pub level_after_ml: f64,
    pub notes: String,
}
