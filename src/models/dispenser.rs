use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispenser {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub refill_capacity_ml: f64,
    /// Level right after the last refill, not the live level.
    pub current_level_ml: Option<f64>,
    pub last_refill_date: Option<DateTime<Utc>>,
    pub current_schedule_id: Option<i64>,
    /// Per-machine override of the schedule's ml/hour.
    pub ml_per_hour: Option<f64>,
}

impl Dispenser {
    pub fn new(id: i64, name: impl Into<String>, capacity_ml: f64) -> Self {
        Self {
            id,
            name: name.into(),
            location: String::new(),
            refill_capacity_ml: capacity_ml,
            current_level_ml: None,
            last_refill_date: None,
            current_schedule_id: None,
            ml_per_hour: None,
        }
    }

    /// Capacity sanitized for arithmetic: non-finite or negative becomes 0.
    pub fn capacity(&self) -> f64 {
        if self.refill_capacity_ml.is_finite() && self.refill_capacity_ml > 0.0 {
            self.refill_capacity_ml
        } else {
            0.0
        }
    }

    /// Level recorded at the last refill, or the capacity when unknown.
    pub fn baseline_level(&self) -> f64 {
        match self.current_level_ml {
            Some(v) if v.is_finite() => v,
            _ => self.capacity(),
        }
    }
}
