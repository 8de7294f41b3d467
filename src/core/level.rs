//! Live fluid level of a dispenser.

use crate::core::usage;
use crate::models::{Dispenser, Schedule, UsageInfo};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Where the level figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EstimateSource {
    /// No refill date, no schedule, or nothing to consume: stored level as is.
    NoDecay,
    /// Usage service figure.
    Authoritative,
    /// Recomputed from the schedule.
    Local,
}

impl EstimateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateSource::NoDecay => "no decay",
            EstimateSource::Authoritative => "usage service",
            EstimateSource::Local => "local estimate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelEstimate {
    pub level_ml: f64,
    pub capacity_ml: f64,
    pub daily_usage_ml: Option<f64>,
    pub usage_since_refill_ml: Option<f64>,
    pub source: EstimateSource,
}

impl LevelEstimate {
    pub fn fill_percent(&self) -> f64 {
        if self.capacity_ml > 0.0 {
            self.level_ml / self.capacity_ml * 100.0
        } else {
            0.0
        }
    }

    /// Days left at the current rate, when there is a rate.
    pub fn days_until_empty(&self) -> Option<f64> {
        self.daily_usage_ml
            .filter(|d| *d > 0.0)
            .map(|d| self.level_ml / d)
    }

    pub fn max_addable_ml(&self) -> f64 {
        (self.capacity_ml - self.level_ml).max(0.0)
    }
}

fn clamp_level(v: f64, capacity: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, capacity) } else { 0.0 }
}

/// Fractional days between two instants; negative spans count as 0.
pub fn days_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let ms = (now - since).num_milliseconds() as f64;
    (ms / MS_PER_DAY).max(0.0)
}

pub struct LevelEstimator;

impl LevelEstimator {
    /// Current level in ml, always within `[0, capacity]`.
    pub fn current_level(
        dispenser: &Dispenser,
        schedule: Option<&Schedule>,
        usage_info: Option<&UsageInfo>,
        now: DateTime<Utc>,
    ) -> f64 {
        Self::estimate(dispenser, schedule, usage_info, now).level_ml
    }

    pub fn estimate(
        dispenser: &Dispenser,
        schedule: Option<&Schedule>,
        usage_info: Option<&UsageInfo>,
        now: DateTime<Utc>,
    ) -> LevelEstimate {
        let capacity = dispenser.capacity();
        let baseline = dispenser.baseline_level();

        let no_decay = |daily: Option<f64>| LevelEstimate {
            level_ml: clamp_level(baseline, capacity),
            capacity_ml: capacity,
            daily_usage_ml: daily,
            usage_since_refill_ml: None,
            source: EstimateSource::NoDecay,
        };

        let (Some(last_refill), Some(schedule_id)) =
            (dispenser.last_refill_date, dispenser.current_schedule_id)
        else {
            return no_decay(None);
        };

        let Some(schedule) = schedule else {
            debug!(
                dispenser = dispenser.id,
                schedule = schedule_id,
                "schedule not resolved, no decay applied"
            );
            return no_decay(None);
        };

        let daily = usage::daily_usage(schedule, dispenser.ml_per_hour);

        if let Some(used) = usage_info.and_then(UsageInfo::authoritative_usage) {
            return LevelEstimate {
                level_ml: clamp_level(baseline - used, capacity),
                capacity_ml: capacity,
                daily_usage_ml: usage_info
                    .and_then(|u| u.daily_usage_ml)
                    .filter(|d| d.is_finite())
                    .or(Some(daily)),
                usage_since_refill_ml: Some(used),
                source: EstimateSource::Authoritative,
            };
        }

        if daily == 0.0 {
            return no_decay(Some(0.0));
        }

        let used = days_elapsed(last_refill, now) * daily;

        LevelEstimate {
            level_ml: clamp_level(baseline - used, capacity),
            capacity_ml: capacity,
            daily_usage_ml: Some(daily),
            usage_since_refill_ml: Some(used),
            source: EstimateSource::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScheduleKind, TimeRange};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
    }

    /// 720 ml/day
    fn schedule() -> Schedule {
        Schedule::new(
            7,
            "night",
            ScheduleKind::TimeBased {
                time_ranges: vec![TimeRange::parse("00:00-06:00/20/40").unwrap()],
            },
        )
    }

    fn dispenser(level: f64) -> Dispenser {
        let mut d = Dispenser::new(1, "lobby", 1000.0);
        d.current_level_ml = Some(level);
        d.last_refill_date = Some(t0());
        d.current_schedule_id = Some(7);
        d
    }

    #[test]
    fn no_refill_date_means_no_decay() {
        let mut d = dispenser(400.0);
        d.last_refill_date = None;
        let e = LevelEstimator::estimate(&d, Some(&schedule()), None, t0() + Duration::days(3));
        assert_eq!(e.level_ml, 400.0);
        assert_eq!(e.source, EstimateSource::NoDecay);
    }

    #[test]
    fn unknown_level_defaults_to_capacity() {
        let mut d = dispenser(0.0);
        d.current_level_ml = None;
        d.current_schedule_id = None;
        assert_eq!(LevelEstimator::current_level(&d, None, None, t0()), 1000.0);
    }

    #[test]
    fn unresolved_schedule_means_no_decay() {
        let d = dispenser(600.0);
        let level = LevelEstimator::current_level(&d, None, None, t0() + Duration::days(1));
        assert_eq!(level, 600.0);
    }

    #[test]
    fn local_decay_uses_fractional_days() {
        let d = dispenser(1000.0);
        let level =
            LevelEstimator::current_level(&d, Some(&schedule()), None, t0() + Duration::hours(12));
        assert!((level - 640.0).abs() < 1e-9);
    }

    #[test]
    fn authoritative_usage_wins() {
        let d = dispenser(1000.0);
        let info = UsageInfo {
            usage_since_refill_ml: Some(100.0),
            daily_usage_ml: Some(50.0),
        };
        let e = LevelEstimator::estimate(&d, Some(&schedule()), Some(&info), t0() + Duration::days(1));
        // the local model would say 280
        assert_eq!(e.level_ml, 900.0);
        assert_eq!(e.source, EstimateSource::Authoritative);
        assert_eq!(e.daily_usage_ml, Some(50.0));
    }

    #[test]
    fn non_finite_authoritative_usage_is_ignored() {
        let d = dispenser(1000.0);
        let info = UsageInfo {
            usage_since_refill_ml: Some(f64::NAN),
            daily_usage_ml: None,
        };
        let e = LevelEstimator::estimate(&d, Some(&schedule()), Some(&info), t0() + Duration::days(1));
        assert_eq!(e.source, EstimateSource::Local);
        assert!((e.level_ml - 280.0).abs() < 1e-9);
    }

    #[test]
    fn idle_schedule_keeps_level() {
        let idle = Schedule::new(
            7,
            "idle",
            ScheduleKind::IntervalBased {
                intervals: vec![],
                duration_minutes: 0.0,
                daily_cycles: 0.0,
            },
        );
        let d = dispenser(300.0);
        let e = LevelEstimator::estimate(&d, Some(&idle), None, t0() + Duration::days(30));
        assert_eq!(e.level_ml, 300.0);
        assert_eq!(e.days_until_empty(), None);
    }

    #[test]
    fn level_is_bounded_after_a_thousand_days() {
        let d = dispenser(1000.0);
        let level =
            LevelEstimator::current_level(&d, Some(&schedule()), None, t0() + Duration::days(1000));
        assert_eq!(level, 0.0);

        let info = UsageInfo {
            usage_since_refill_ml: Some(-5000.0),
            daily_usage_ml: None,
        };
        let level = LevelEstimator::current_level(&d, Some(&schedule()), Some(&info), t0());
        assert_eq!(level, 1000.0);
    }

    #[test]
    fn stored_level_above_capacity_is_clamped() {
        let mut d = dispenser(1500.0);
        d.last_refill_date = None;
        assert_eq!(LevelEstimator::current_level(&d, None, None, t0()), 1000.0);
    }

    #[test]
    fn clock_before_refill_does_not_add_fluid() {
        let d = dispenser(500.0);
        let level =
            LevelEstimator::current_level(&d, Some(&schedule()), None, t0() - Duration::days(2));
        assert_eq!(level, 500.0);
    }

    #[test]
    fn repeated_calls_agree() {
        let d = dispenser(800.0);
        let s = schedule();
        let now = t0() + Duration::minutes(1234);
        let a = LevelEstimator::estimate(&d, Some(&s), None, now);
        let b = LevelEstimator::estimate(&d, Some(&s), None, now);
        assert_eq!(a, b);
    }

    #[test]
    fn derived_figures() {
        let d = dispenser(1000.0);
        let e = LevelEstimator::estimate(&d, Some(&schedule()), None, t0() + Duration::hours(12));
        assert!((e.fill_percent() - 64.0).abs() < 1e-9);
        assert!((e.days_until_empty().unwrap() - 640.0 / 720.0).abs() < 1e-9);
        assert!((e.max_addable_ml() - 360.0).abs() < 1e-9);
    }
}
