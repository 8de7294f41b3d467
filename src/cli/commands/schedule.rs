use crate::cli::parser::{Commands, ScheduleAction};
use crate::config::Config;
use crate::core::snapshot::FleetSource;
use crate::core::usage;
use crate::db::store::SqliteStore;
use crate::errors::AppResult;
use crate::models::{Interval, Schedule, ScheduleKind, TimeRange, WeekdaySet};
use crate::ui::messages::{header, info, success, warning};
use crate::utils::formatting::{ml, ml_opt};
use crate::utils::table::{Align, Table};
use crate::utils::time::{format_minutes, format_time};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Schedule { action } = cmd else {
        return Ok(());
    };

    let mut store = SqliteStore::open(&cfg.database)?;

    match action {
        ScheduleAction::Add {
            name,
            ranges,
            intervals,
            duration,
            cycles,
            ml_per_hour,
            days,
        } => {
            let time_ranges = ranges
                .iter()
                .map(|r| TimeRange::parse(r))
                .collect::<AppResult<Vec<_>>>()?;
            let intervals = intervals
                .iter()
                .map(|i| Interval::parse(i))
                .collect::<AppResult<Vec<_>>>()?;

            let kind = ScheduleKind::from_parts(time_ranges, intervals, *duration, *cycles)?;
            if kind.is_empty() {
                warning("Schedule has no ranges or intervals: it will not consume any fluid.");
            }

            let schedule = Schedule::new(0, name.clone(), kind)
                .with_ml_per_hour(*ml_per_hour)
                .with_days(WeekdaySet::parse(days)?);

            let daily = usage::daily_usage(&schedule, None);
            let id = store.add_schedule(&schedule)?;
            success(format!(
                "Schedule #{id} '{}' added ({} schedule, {}/day).",
                schedule.name,
                schedule.kind.label(),
                ml(daily)
            ));
        }

        ScheduleAction::List => {
            let schedules = store.schedules()?;
            if schedules.is_empty() {
                info("No schedules defined.");
                return Ok(());
            }

            let mut table = Table::new(&[
                ("ID", Align::Right),
                ("Name", Align::Left),
                ("Type", Align::Left),
                ("ml/h", Align::Right),
                ("Days", Align::Left),
                ("Active", Align::Right),
                ("Daily usage", Align::Right),
            ]);
            for s in &schedules {
                table.add_row(vec![
                    s.id.to_string(),
                    s.name.clone(),
                    s.kind.label().to_string(),
                    s.ml_per_hour
                        .map(|r| format!("{r:.2}"))
                        .unwrap_or_else(|| "--".into()),
                    s.days_of_week.describe(),
                    format_minutes(usage::active_minutes_per_day(s).round() as i64),
                    ml(usage::daily_usage(s, None)),
                ]);
            }
            print!("{}", table.render());
        }

        ScheduleAction::Show { id } => {
            let s = store.schedule(*id)?;
            header(format!("Schedule #{} {}", s.id, s.name));
            println!("Type        : {}", s.kind.label());
            println!("Days        : {}", s.days_of_week.describe());
            println!("ml/hour     : {}", ml_opt(s.ml_per_hour));

            match &s.kind {
                ScheduleKind::TimeBased { time_ranges } => {
                    for r in time_ranges {
                        println!(
                            "  {}-{}{}  {} min, {} per cycle",
                            format_time(r.start_time),
                            format_time(r.end_time),
                            if r.wraps_midnight() { " (+1d)" } else { "" },
                            usage::range_duration_minutes(r),
                            ml(usage::cycle_volume_ml(r))
                        );
                    }
                }
                ScheduleKind::IntervalBased {
                    duration_minutes,
                    daily_cycles,
                    ..
                } => {
                    println!("Run length  : {duration_minutes} min x {daily_cycles} per day");
                }
            }

            println!("\nUsage breakdown:");
            for c in usage::usage_breakdown(&s, None) {
                println!("  {:<40} {:>12}", c.label, ml(c.daily_ml));
            }
            println!("Daily usage : {}", ml(usage::daily_usage(&s, None)));
        }

        ScheduleAction::Del { id } => {
            store.delete_schedule(*id)?;
            success(format!("Schedule #{id} deleted."));
        }
    }

    Ok(())
}
