use crate::cli::parser::{Commands, DispenserAction};
use crate::config::Config;
use crate::core::snapshot::FleetSnapshot;
use crate::db::store::SqliteStore;
use crate::errors::{AppError, AppResult};
use crate::models::Dispenser;
use crate::ui::messages::{info, success};
use crate::utils::colors::{RESET, color_for_level, colorize_optional};
use crate::utils::date;
use crate::utils::formatting::{days2readable, gauge, ml, ml_opt, percent};
use crate::utils::table::{Align, Table};

fn parse_schedule_ref(s: &str) -> AppResult<Option<i64>> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    s.trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::InvalidInput(format!("schedule id '{s}'")))
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Dispenser { action } = cmd else {
        return Ok(());
    };

    let mut store = SqliteStore::open(&cfg.database)?;

    match action {
        DispenserAction::Add {
            name,
            capacity,
            level,
            location,
            schedule,
            ml_per_hour,
        } => {
            let capacity = capacity.unwrap_or(cfg.default_capacity_ml);
            if !capacity.is_finite() || capacity <= 0.0 {
                return Err(AppError::InvalidInput(format!(
                    "capacity must be a positive number of ml (got {capacity})"
                )));
            }
            if let Some(l) = level
                && (!l.is_finite() || *l < 0.0 || *l > capacity)
            {
                return Err(AppError::InvalidInput(format!(
                    "level {l} ml is outside 0..{capacity} ml"
                )));
            }

            let mut d = Dispenser::new(0, name.clone(), capacity);
            d.location = location.clone();
            d.current_level_ml = *level;
            // a known level starts the decay clock
            d.last_refill_date = level.map(|_| date::now());
            d.current_schedule_id = *schedule;
            d.ml_per_hour = *ml_per_hour;

            let id = store.add_dispenser(&d)?;
            success(format!("Dispenser #{id} '{name}' added ({}).", ml(capacity)));
        }

        DispenserAction::List { at } => {
            let now = date::parse_at(at.as_ref())?;
            let snapshot = FleetSnapshot::load(&store, now)?;

            if snapshot.dispensers.is_empty() {
                info("No dispensers registered.");
                return Ok(());
            }

            let mut table = Table::new(&[
                ("ID", Align::Right),
                ("Name", Align::Left),
                ("Location", Align::Left),
                ("Schedule", Align::Left),
                ("Level", Align::Right),
                ("Fill", Align::Left),
                ("Daily", Align::Right),
                ("Empty in", Align::Right),
            ]);

            for d in &snapshot.dispensers {
                let e = snapshot.estimate(d, now);
                let fill = e.fill_percent();
                let color = color_for_level(fill, cfg.low_level_percent);
                let low = if fill < cfg.low_level_percent { " LOW" } else { "" };

                let schedule = snapshot
                    .schedule_for(d)
                    .map(|s| format!("#{} {}", s.id, s.name))
                    .unwrap_or_default();

                table.add_row(vec![
                    d.id.to_string(),
                    d.name.clone(),
                    colorize_optional(&d.location),
                    colorize_optional(&schedule),
                    ml(e.level_ml),
                    format!("{color}{} {}{low}{RESET}", gauge(fill), percent(fill)),
                    ml_opt(e.daily_usage_ml),
                    e.days_until_empty()
                        .map(days2readable)
                        .unwrap_or_else(|| "--".into()),
                ]);
            }

            print!("{}", table.render());
        }

        DispenserAction::Assign { id, schedule } => {
            let schedule_id = parse_schedule_ref(schedule)?;
            store.assign_schedule(*id, schedule_id)?;
            match schedule_id {
                Some(sid) => success(format!("Dispenser #{id} now runs schedule #{sid}.")),
                None => success(format!("Dispenser #{id} has no schedule.")),
            }
        }

        DispenserAction::Rate {
            id,
            ml_per_hour,
            clear,
        } => {
            if ml_per_hour.is_none() && !*clear {
                return Err(AppError::InvalidInput(
                    "give --ml-per-hour VALUE or --clear".into(),
                ));
            }
            store.set_dispenser_rate(*id, *ml_per_hour)?;
            success(format!(
                "Dispenser #{id} ml/hour override: {}",
                ml_per_hour.map(|r| format!("{r}")).unwrap_or_else(|| "cleared".into())
            ));
        }

        DispenserAction::Del { id } => {
            store.delete_dispenser(*id)?;
            success(format!("Dispenser #{id} deleted."));
        }
    }

    Ok(())
}
