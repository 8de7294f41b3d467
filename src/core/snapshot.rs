//! Point-in-time view of the fleet used by every level computation.

use crate::core::level::{LevelEstimate, LevelEstimator};
use crate::errors::AppResult;
use crate::models::{Dispenser, RefillLog, RefillPayload, Schedule, UsageInfo};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

/// The collaborator that owns schedules, dispensers and refill history.
pub trait FleetSource {
    fn schedules(&self) -> AppResult<Vec<Schedule>>;
    fn dispensers(&self) -> AppResult<Vec<Dispenser>>;
    /// Authoritative usage for one dispenser. Callers must tolerate failure.
    fn calculate_usage(&self, dispenser_id: i64, now: DateTime<Utc>) -> AppResult<UsageInfo>;
    fn refill_logs(&self) -> AppResult<Vec<RefillLog>>;
    /// Append a refill and move the dispenser baseline to the new level.
    fn log_refill(&mut self, dispenser_id: i64, payload: &RefillPayload) -> AppResult<RefillLog>;
}

#[derive(Debug, Clone, Default)]
pub struct FleetSnapshot {
    pub schedules: HashMap<i64, Schedule>,
    pub dispensers: Vec<Dispenser>,
    pub usage: HashMap<i64, UsageInfo>,
    pub refill_logs: Vec<RefillLog>,
    pub taken_at: Option<DateTime<Utc>>,
}

impl FleetSnapshot {
    /// Fetch everything once. A failing usage lookup only drops that entry.
    pub fn load<S: FleetSource + ?Sized>(source: &S, now: DateTime<Utc>) -> AppResult<Self> {
        let schedules = source
            .schedules()?
            .into_iter()
            .map(|s| (s.id, s))
            .collect::<HashMap<_, _>>();
        let refill_logs = source.refill_logs()?;

        let mut dispensers = source.dispensers()?;
        for d in dispensers.iter_mut() {
            fill_baseline_from_history(d, &refill_logs);
        }

        let mut usage = HashMap::new();
        for d in &dispensers {
            match source.calculate_usage(d.id, now) {
                Ok(info) => {
                    usage.insert(d.id, info);
                }
                Err(e) => warn!(dispenser = d.id, error = %e, "usage service unavailable, using local estimate"),
            }
        }

        debug!(
            schedules = schedules.len(),
            dispensers = dispensers.len(),
            usage = usage.len(),
            "fleet snapshot loaded"
        );

        Ok(Self {
            schedules,
            dispensers,
            usage,
            refill_logs,
            taken_at: Some(now),
        })
    }

    /// Replace the whole snapshot. On error the previous one is kept intact.
    pub fn reload<S: FleetSource + ?Sized>(&mut self, source: &S, now: DateTime<Utc>) -> AppResult<()> {
        *self = Self::load(source, now)?;
        Ok(())
    }

    pub fn dispenser(&self, id: i64) -> Option<&Dispenser> {
        self.dispensers.iter().find(|d| d.id == id)
    }

    pub fn schedule_for(&self, dispenser: &Dispenser) -> Option<&Schedule> {
        dispenser
            .current_schedule_id
            .and_then(|id| self.schedules.get(&id))
    }

    pub fn usage_for(&self, dispenser_id: i64) -> Option<&UsageInfo> {
        self.usage.get(&dispenser_id)
    }

    pub fn estimate(&self, dispenser: &Dispenser, now: DateTime<Utc>) -> LevelEstimate {
        LevelEstimator::estimate(
            dispenser,
            self.schedule_for(dispenser),
            self.usage_for(dispenser.id),
            now,
        )
    }

    /// Same as `estimate` but ignoring the usage service.
    pub fn local_estimate(&self, dispenser: &Dispenser, now: DateTime<Utc>) -> LevelEstimate {
        LevelEstimator::estimate(dispenser, self.schedule_for(dispenser), None, now)
    }

    pub fn current_level(&self, dispenser_id: i64, now: DateTime<Utc>) -> Option<f64> {
        self.dispenser(dispenser_id)
            .map(|d| self.estimate(d, now).level_ml)
    }

    pub fn refills_for(&self, dispenser_id: i64) -> impl Iterator<Item = &RefillLog> {
        self.refill_logs
            .iter()
            .filter(move |l| l.dispenser_id == dispenser_id)
    }
}

/// A dispenser with neither a level nor a refill date takes both from its
/// latest refill log. A partial record is left as stored.
fn fill_baseline_from_history(dispenser: &mut Dispenser, logs: &[RefillLog]) {
    if dispenser.current_level_ml.is_some() || dispenser.last_refill_date.is_some() {
        return;
    }

    let Some(latest) = logs
        .iter()
        .filter(|l| l.dispenser_id == dispenser.id)
        .max_by_key(|l| l.timestamp)
    else {
        return;
    };

    debug!(dispenser = dispenser.id, log = latest.id, "baseline taken from refill history");
    dispenser.current_level_ml = Some(latest.current_ml_refill);
    dispenser.last_refill_date = Some(latest.timestamp);
}
