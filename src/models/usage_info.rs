use serde::{Deserialize, Serialize};

/// Usage figures computed by the usage service for one dispenser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub usage_since_refill_ml: Option<f64>,
    pub daily_usage_ml: Option<f64>,
}

impl UsageInfo {
    /// The authoritative consumption, when it is a usable number.
    pub fn authoritative_usage(&self) -> Option<f64> {
        self.usage_since_refill_ml.filter(|v| v.is_finite())
    }
}
