use super::weekdays::WeekdaySet;
use crate::errors::{AppError, AppResult};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// One clock window of a time-based schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "crate::utils::time::hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::utils::time::hhmm")]
    pub end_time: NaiveTime,
    pub spray_seconds: f64,
    pub pause_seconds: f64,
}

impl TimeRange {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime, spray: f64, pause: f64) -> Self {
        Self {
            start_time,
            end_time,
            spray_seconds: spray,
            pause_seconds: pause,
        }
    }

    /// Parse "HH:MM-HH:MM/SPRAY/PAUSE" (the CLI shape).
    pub fn parse(s: &str) -> AppResult<Self> {
        let bad = || AppError::InvalidInput(format!("time range '{s}' (expected HH:MM-HH:MM/SPRAY/PAUSE)"));

        let (window, cadence) = s.split_once('/').ok_or_else(bad)?;
        let (start, end) = window.split_once('-').ok_or_else(bad)?;
        let (spray, pause) = cadence.split_once('/').ok_or_else(bad)?;

        Ok(Self {
            start_time: crate::utils::time::parse_time_strict(start)?,
            end_time: crate::utils::time::parse_time_strict(end)?,
            spray_seconds: parse_seconds(spray)?,
            pause_seconds: parse_seconds(pause)?,
        })
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end_time < self.start_time
    }
}

/// One spray/pause step of an interval-based schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub spray_seconds: f64,
    pub pause_seconds: f64,
}

impl Interval {
    pub fn new(spray: f64, pause: f64) -> Self {
        Self {
            spray_seconds: spray,
            pause_seconds: pause,
        }
    }

    /// Parse "SPRAY/PAUSE".
    pub fn parse(s: &str) -> AppResult<Self> {
        let (spray, pause) = s
            .split_once('/')
            .ok_or_else(|| AppError::InvalidInput(format!("interval '{s}' (expected SPRAY/PAUSE)")))?;
        Ok(Self::new(parse_seconds(spray)?, parse_seconds(pause)?))
    }
}

fn parse_seconds(s: &str) -> AppResult<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| AppError::InvalidInput(format!("'{s}' is not a number of seconds")))
}

/// The two mutually exclusive schedule shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleKind {
    TimeBased {
        time_ranges: Vec<TimeRange>,
    },
    IntervalBased {
        intervals: Vec<Interval>,
        duration_minutes: f64,
        daily_cycles: f64,
    },
}

impl ScheduleKind {
    /// Build from the raw two-list shape, rejecting data for both variants.
    /// Two empty lists give an interval schedule that consumes nothing.
    pub fn from_parts(
        time_ranges: Vec<TimeRange>,
        intervals: Vec<Interval>,
        duration_minutes: f64,
        daily_cycles: f64,
    ) -> AppResult<Self> {
        match (time_ranges.is_empty(), intervals.is_empty()) {
            (false, false) => Err(AppError::InvalidInput(
                "a schedule has either time ranges or intervals, not both".into(),
            )),
            (false, true) => Ok(Self::TimeBased { time_ranges }),
            _ => Ok(Self::IntervalBased {
                intervals,
                duration_minutes,
                daily_cycles,
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TimeBased { .. } => "time",
            Self::IntervalBased { .. } => "interval",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::TimeBased { time_ranges } => time_ranges.is_empty(),
            Self::IntervalBased { intervals, .. } => intervals.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub name: String,
    pub kind: ScheduleKind,
    pub ml_per_hour: Option<f64>,
    #[serde(default)]
    pub days_of_week: WeekdaySet,
}

impl Schedule {
    pub fn new(id: i64, name: impl Into<String>, kind: ScheduleKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            ml_per_hour: None,
            days_of_week: WeekdaySet::all(),
        }
    }

    pub fn with_ml_per_hour(mut self, rate: Option<f64>) -> Self {
        self.ml_per_hour = rate;
        self
    }

    pub fn with_days(mut self, days: WeekdaySet) -> Self {
        self.days_of_week = days;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cli_range() {
        let r = TimeRange::parse("22:00-02:00/10/50").unwrap();
        assert!(r.wraps_midnight());
        assert_eq!(r.spray_seconds, 10.0);
        assert_eq!(r.pause_seconds, 50.0);
    }

    #[test]
    fn rejects_malformed_range() {
        assert!(TimeRange::parse("22:00/10/50").is_err());
        assert!(TimeRange::parse("22:00-02:00/ten/50").is_err());
        assert!(Interval::parse("20").is_err());
    }

    #[test]
    fn both_variants_populated_is_rejected() {
        let ranges = vec![TimeRange::parse("00:00-06:00/20/40").unwrap()];
        let intervals = vec![Interval::new(20.0, 40.0)];
        let err = ScheduleKind::from_parts(ranges, intervals, 60.0, 1.0).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn empty_parts_are_an_idle_interval_schedule() {
        let kind = ScheduleKind::from_parts(vec![], vec![], 0.0, 0.0).unwrap();
        assert_eq!(kind.label(), "interval");
        assert!(kind.is_empty());
    }

    #[test]
    fn kind_is_tagged_in_json() {
        let kind = ScheduleKind::from_parts(
            vec![TimeRange::parse("08:00-09:30/5/55").unwrap()],
            vec![],
            0.0,
            0.0,
        )
        .unwrap();
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains(r#""type":"time_based""#));
        assert!(json.contains(r#""start_time":"08:00""#));
        let back: ScheduleKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}
