//! Daily fluid usage of a schedule.
//!
//! This is the single implementation of the consumption formula: the local
//! level estimate and the store's usage service both call into it.

use crate::models::{Interval, Schedule, ScheduleKind, TimeRange};
use crate::utils::time::minutes_between;

/// Volume dispensed per second of spraying when no ml/hour rate is known.
pub const ML_PER_SPRAY_SECOND: f64 = 0.1;

/// Maximum accepted gap between the local estimate and the usage service.
pub const USAGE_TOLERANCE_ML: f64 = 0.001;

/// Values typed into forms may be negative or NaN; treat them as 0.
pub(crate) fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

fn rate(v: Option<f64>) -> Option<f64> {
    v.map(non_negative).filter(|r| *r > 0.0)
}

/// A dispenser override wins over the schedule rate.
pub fn effective_ml_per_hour(schedule: &Schedule, override_rate: Option<f64>) -> Option<f64> {
    rate(override_rate).or_else(|| rate(schedule.ml_per_hour))
}

pub fn range_duration_minutes(range: &TimeRange) -> i64 {
    minutes_between(range.start_time, range.end_time)
}

/// Volume of one spray/pause cycle of a time range.
pub fn cycle_volume_ml(range: &TimeRange) -> f64 {
    non_negative(range.spray_seconds) * ML_PER_SPRAY_SECOND
}

fn range_usage(range: &TimeRange, ml_per_hour: Option<f64>) -> f64 {
    let minutes = range_duration_minutes(range) as f64;

    // a range without a spray/pause cycle never runs, whatever the rate
    let spray = non_negative(range.spray_seconds);
    let cycle = spray + non_negative(range.pause_seconds);
    if cycle <= 0.0 {
        return 0.0;
    }

    if let Some(rate) = ml_per_hour {
        return minutes / 60.0 * rate;
    }

    let cycles = minutes * 60.0 / cycle;
    cycles * spray * ML_PER_SPRAY_SECOND
}

fn interval_usage(interval: &Interval, daily_cycles: f64, ml_per_hour: Option<f64>) -> f64 {
    let spray = non_negative(interval.spray_seconds);
    let per_run = match ml_per_hour {
        Some(rate) => spray / 3600.0 * rate,
        None => spray * ML_PER_SPRAY_SECOND,
    };
    per_run * non_negative(daily_cycles)
}

/// Expected consumption in ml/day. Always finite and >= 0.
pub fn daily_usage(schedule: &Schedule, override_rate: Option<f64>) -> f64 {
    usage_breakdown(schedule, override_rate)
        .iter()
        .fold(0.0, |acc, c| acc + c.daily_ml)
}

/// Contribution of one range or interval to the daily usage.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageContribution {
    pub label: String,
    pub daily_ml: f64,
}

pub fn usage_breakdown(schedule: &Schedule, override_rate: Option<f64>) -> Vec<UsageContribution> {
    let ml_per_hour = effective_ml_per_hour(schedule, override_rate);

    match &schedule.kind {
        ScheduleKind::TimeBased { time_ranges } => time_ranges
            .iter()
            .map(|r| UsageContribution {
                label: format!(
                    "{}-{} spray {}s / pause {}s",
                    r.start_time.format("%H:%M"),
                    r.end_time.format("%H:%M"),
                    r.spray_seconds,
                    r.pause_seconds
                ),
                daily_ml: range_usage(r, ml_per_hour),
            })
            .collect(),
        ScheduleKind::IntervalBased {
            intervals,
            daily_cycles,
            ..
        } => intervals
            .iter()
            .map(|i| UsageContribution {
                label: format!(
                    "spray {}s / pause {}s x{}",
                    i.spray_seconds, i.pause_seconds, daily_cycles
                ),
                daily_ml: interval_usage(i, *daily_cycles, ml_per_hour),
            })
            .collect(),
    }
}

/// Minutes per day the schedule is running (display only).
pub fn active_minutes_per_day(schedule: &Schedule) -> f64 {
    match &schedule.kind {
        ScheduleKind::TimeBased { time_ranges } => time_ranges
            .iter()
            .fold(0.0, |acc, r| acc + range_duration_minutes(r) as f64),
        ScheduleKind::IntervalBased {
            duration_minutes,
            daily_cycles,
            ..
        } => non_negative(*duration_minutes) * non_negative(*daily_cycles),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn time_schedule(ranges: &[&str]) -> Schedule {
        let ranges = ranges.iter().map(|r| TimeRange::parse(r).unwrap()).collect();
        Schedule::new(1, "t", ScheduleKind::TimeBased { time_ranges: ranges })
    }

    fn interval_schedule(intervals: Vec<Interval>, cycles: f64) -> Schedule {
        Schedule::new(
            2,
            "i",
            ScheduleKind::IntervalBased {
                intervals,
                duration_minutes: 30.0,
                daily_cycles: cycles,
            },
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn six_hour_window_uses_spray_constant() {
        let s = time_schedule(&["00:00-06:00/20/40"]);
        assert!(close(daily_usage(&s, None), 720.0));
    }

    #[test]
    fn window_crossing_midnight() {
        let s = time_schedule(&["22:00-02:00/10/50"]);
        assert!(close(daily_usage(&s, None), 240.0));
    }

    #[test]
    fn ranges_are_summed() {
        let s = time_schedule(&["00:00-06:00/20/40", "22:00-02:00/10/50"]);
        assert!(close(daily_usage(&s, None), 960.0));
        assert_eq!(usage_breakdown(&s, None).len(), 2);
    }

    #[test]
    fn interval_with_ml_per_hour() {
        let s = interval_schedule(vec![Interval::new(20.0, 40.0)], 3.0).with_ml_per_hour(Some(5.0));
        assert!(close(daily_usage(&s, None), 60.0 / 3600.0 * 5.0));
        assert!((daily_usage(&s, None) - 0.0833).abs() < 1e-4);
    }

    #[test]
    fn interval_without_rate() {
        let s = interval_schedule(vec![Interval::new(20.0, 40.0), Interval::new(5.0, 10.0)], 4.0);
        // (20 + 5) * 0.1 * 4
        assert!(close(daily_usage(&s, None), 10.0));
    }

    #[test]
    fn time_based_with_ml_per_hour_uses_active_time() {
        let s = time_schedule(&["22:00-02:00/10/50", "08:00-09:00/1/1"]).with_ml_per_hour(Some(3.0));
        assert!(close(daily_usage(&s, None), 15.0));
    }

    #[test]
    fn dispenser_override_takes_precedence() {
        let s = time_schedule(&["08:00-10:00/10/50"]).with_ml_per_hour(Some(3.0));
        assert!(close(daily_usage(&s, Some(10.0)), 20.0));
        // A zero or bogus override falls back to the schedule rate.
        assert!(close(daily_usage(&s, Some(0.0)), 6.0));
        assert!(close(daily_usage(&s, Some(f64::NAN)), 6.0));
    }

    #[test]
    fn zero_cycle_range_contributes_nothing() {
        let s = time_schedule(&["00:00-06:00/0/0", "22:00-02:00/10/50"]);
        assert!(close(daily_usage(&s, None), 240.0));
    }

    #[test]
    fn zero_cycle_range_ignores_ml_per_hour() {
        let idle = TimeRange::new(
            NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            0.0,
            0.0,
        );
        let s = Schedule::new(3, "idle", ScheduleKind::TimeBased { time_ranges: vec![idle] })
            .with_ml_per_hour(Some(5.0));
        assert_eq!(daily_usage(&s, None), 0.0);
        assert_eq!(daily_usage(&s, Some(8.0)), 0.0);

        let s = time_schedule(&["00:00-06:00/0/0", "08:00-10:00/5/5"]).with_ml_per_hour(Some(5.0));
        assert!(close(daily_usage(&s, None), 10.0));
    }

    #[test]
    fn negative_inputs_are_clamped() {
        let s = time_schedule(&["00:00-06:00/-20/40"]);
        assert_eq!(daily_usage(&s, None), 0.0);

        let s = time_schedule(&["00:00-06:00/20/-40"]);
        // pause clamped to 0: continuous spraying for six hours
        assert!(close(daily_usage(&s, None), 21600.0 * 0.1));

        let s = interval_schedule(vec![Interval::new(20.0, 40.0)], -3.0);
        assert_eq!(daily_usage(&s, None), 0.0);
    }

    #[test]
    fn empty_schedules_consume_nothing() {
        assert_eq!(daily_usage(&time_schedule(&[]), None), 0.0);
        assert_eq!(daily_usage(&interval_schedule(vec![], 5.0), Some(4.0)), 0.0);
    }

    #[test]
    fn usage_is_never_negative() {
        let cases = [
            time_schedule(&["10:00-10:00/5/5"]),
            time_schedule(&["23:00-01:00/-1/-1"]),
            interval_schedule(vec![Interval::new(f64::NAN, 1.0)], f64::INFINITY),
            time_schedule(&["01:00-02:00/5/5"]).with_ml_per_hour(Some(-8.0)),
        ];
        for s in &cases {
            let u = daily_usage(s, None);
            assert!(u.is_finite() && u >= 0.0, "{u} for {s:?}");
        }
    }

    #[test]
    fn cycle_volume_and_active_minutes() {
        let r = TimeRange::parse("22:00-02:00/10/50").unwrap();
        assert!(close(cycle_volume_ml(&r), 1.0));
        assert_eq!(range_duration_minutes(&r), 240);
        assert_eq!(active_minutes_per_day(&time_schedule(&["22:00-02:00/10/50"])), 240.0);
        assert_eq!(
            active_minutes_per_day(&interval_schedule(vec![Interval::new(1.0, 1.0)], 3.0)),
            90.0
        );
    }
}
