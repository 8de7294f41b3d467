use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::snapshot::{FleetSnapshot, FleetSource};
use crate::core::usage::USAGE_TOLERANCE_ML;
use crate::db::store::SqliteStore;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{header, warning};
use crate::utils::date;
use crate::utils::formatting::{days2readable, gauge, ml, ml_opt, percent};

/// Handle `level` and `usage`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Level { id, at, local } => {
            let store = SqliteStore::open(&cfg.database)?;
            let now = date::parse_at(at.as_ref())?;
            let snapshot = FleetSnapshot::load(&store, now)?;

            let d = snapshot
                .dispenser(*id)
                .ok_or(AppError::DispenserNotFound(*id))?;

            let e = if *local {
                snapshot.local_estimate(d, now)
            } else {
                snapshot.estimate(d, now)
            };

            header(format!("Dispenser #{} {}", d.id, d.name));
            println!(
                "At             : {}",
                date::display(&snapshot.taken_at.unwrap_or(now))
            );
            println!(
                "Last refill    : {}",
                d.last_refill_date
                    .as_ref()
                    .map(date::display)
                    .unwrap_or_else(|| "--".into())
            );
            println!("Refill level   : {}", ml_opt(d.current_level_ml));
            println!("Refills logged : {}", snapshot.refills_for(d.id).count());
            println!("Used since     : {}", ml_opt(e.usage_since_refill_ml));
            println!("Daily usage    : {}", ml_opt(e.daily_usage_ml));
            println!(
                "Current level  : {} of {} {} {}",
                ml(e.level_ml),
                ml(e.capacity_ml),
                gauge(e.fill_percent()),
                percent(e.fill_percent())
            );
            println!("Can add        : {}", ml(e.max_addable_ml()));
            println!(
                "Empty in       : {}",
                e.days_until_empty()
                    .map(days2readable)
                    .unwrap_or_else(|| "--".into())
            );
            println!("Source         : {}", e.source.as_str());

            if !*local {
                let local_e = snapshot.local_estimate(d, now);
                if (local_e.level_ml - e.level_ml).abs() > USAGE_TOLERANCE_ML {
                    warning(format!(
                        "Local estimate differs from usage service: {} vs {}",
                        ml(local_e.level_ml),
                        ml(e.level_ml)
                    ));
                }
            }
        }

        Commands::Usage { id, at } => {
            let store = SqliteStore::open(&cfg.database)?;
            let now = date::parse_at(at.as_ref())?;
            let info = store.calculate_usage(*id, now)?;

            header(format!("Usage of dispenser #{id}"));
            println!("Since refill : {}", ml_opt(info.usage_since_refill_ml));
            println!("Per day      : {}", ml_opt(info.daily_usage_ml));
        }

        _ => {}
    }

    Ok(())
}
